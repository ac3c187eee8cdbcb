use gradekit_io_xlsx::{
    DocumentSink, SpecRenderOptions, XlsxWriter, build_evaluation_document, parse_payload,
    parse_render_options, render_evaluation_workbook,
};

const C_PAYLOAD: &str = r#"{
    "schema": {
        "title": "Thesis council evaluation",
        "academicYear": "2021-2025",
        "groups": [
            {"id": "G1", "name": "CLO 1", "description": "Problem analysis", "weight": 0.4,
             "criteria": [
                {"id": "C1", "name": "C1.1", "weight": 0.25},
                {"id": "C2", "name": "C1.2", "weight": 0.15, "description": "Literature"}
             ]},
            {"id": "G2", "name": "CLO 2", "weight": 0.6, "criteria": null}
        ]
    },
    "schemas": [
        {"title": "Presentation", "groups": [
            {"id": "P", "name": "Defense", "criteria": [{"id": "D1", "weight": 0.5}]}
        ]},
        {"title": "Unused", "groups": []}
    ],
    "evaluators": [
        {"name": "Tran Thi B", "role": "Chair", "department": "CS", "records": [
            {"subjectId": "S1", "subjectName": "Nguyen Van Anh", "class": "K1",
             "remark": "Clear defense",
             "result": {"totalScore": 8, "scores": [
                {"criterionId": "C1", "value": 0},
                {"criterionId": "C1", "value": 9},
                {"criterionId": "D1", "value": 7.5},
                {"criterionId": "ZZ", "value": 3}
             ]}},
            {"subjectId": "S2", "subjectName": "Le Minh", "class": "K1", "result": null}
        ]},
        {"name": "Tran Thi B", "records": [
            {"subjectId": "S1", "subjectName": "Nguyen Van Anh", "class": "K1",
             "remark": "Needs polish", "result": {"totalScore": 6, "scores": []}}
        ]},
        {"name": null, "records": null}
    ]
}"#;

#[test]
fn test_full_payload_renders_xlsx_bytes() {
    let payload = parse_payload(C_PAYLOAD).expect("payload should decode");
    let cfg_options = SpecRenderOptions::default();

    let v_bytes = render_evaluation_workbook(&payload, &cfg_options).expect("workbook should encode");
    assert!(v_bytes.starts_with(b"PK"));
}

#[test]
fn test_full_payload_document_layout() {
    let payload = parse_payload(C_PAYLOAD).expect("payload should decode");
    let document = build_evaluation_document(&payload, &SpecRenderOptions::default());

    assert_eq!(
        document.sheet_names(),
        vec!["01-Tran Thi B", "02-Tran Thi B", "03-Evaluator", "00-Summary"]
    );
    assert_eq!(document.report.n_evaluator_sheets, 3);
    assert_eq!(document.report.n_summary_entries, 2);

    // 5 identity columns + (2 + 1) + 1 leaves + total + remark
    let sheet_first = &document.sheets[0];
    assert_eq!(sheet_first.width(), 5 + 4 + 2);
    for sheet in &document.sheets[..3] {
        assert!(sheet.width() <= 11);
    }

    let row_header = 17;
    let row_body = row_header + 4;
    assert_eq!(sheet_first.text_at(row_header, 5), Some("Thesis council evaluation"));
    assert_eq!(sheet_first.text_at(row_header, 8), Some("Presentation"));
    assert_eq!(sheet_first.text_at(row_header + 1, 5), Some("CLO 1"));
    assert_eq!(sheet_first.merge_at(row_header + 1, 5).map(|m| m.col_end), Some(6));
    assert_eq!(sheet_first.text_at(row_header + 1, 7), Some("CLO 2"));
    assert_eq!(sheet_first.text_at(row_header + 2, 6), Some("C2"));
    assert_eq!(sheet_first.text_at(row_header + 2, 7), Some(""));
    assert_eq!(sheet_first.text_at(row_header + 3, 7), Some("60%"));

    assert_eq!(sheet_first.number_at(row_body, 5), Some(0.0));
    assert_eq!(sheet_first.number_at(row_body, 6), None);
    assert_eq!(sheet_first.number_at(row_body, 8), Some(7.5));
    assert_eq!(sheet_first.number_at(row_body, 9), Some(8.0));
    assert_eq!(sheet_first.text_at(row_body, 10), Some("Clear defense"));
    assert_eq!(sheet_first.number_at(row_body + 1, 9), None);

    let sheet_summary = document.sheet("00-Summary").expect("summary present");
    assert_eq!(sheet_summary.text_at(2, 5), Some("Score1"));
    assert_eq!(sheet_summary.number_at(4, 5), Some(8.0));
    assert_eq!(sheet_summary.number_at(4, 6), Some(6.0));
    assert_eq!(sheet_summary.number_at(4, 7), None);
    assert_eq!(sheet_summary.number_at(4, 8), Some(7.0));
    assert_eq!(
        sheet_summary.text_at(4, 9),
        Some("Tran Thi B: Clear defense\nTran Thi B: Needs polish")
    );
    assert_eq!(sheet_summary.freeze, Some((4, 5)));
}

#[test]
fn test_options_json_overrides_labels_and_summary() {
    let payload = parse_payload(C_PAYLOAD).expect("payload should decode");
    let cfg_options = parse_render_options(Some(
        r#"{"summary_sheet_name": "Overview", "labels": {"summary_score_prefix": "Pts"}}"#,
    ))
    .expect("options should decode");

    let document = build_evaluation_document(&payload, &cfg_options);
    let sheet_summary = document.sheet("Overview").expect("summary present");
    assert_eq!(sheet_summary.text_at(2, 6), Some("Pts2"));

    let writer = XlsxWriter::new(&cfg_options.style);
    let v_bytes = writer.serialize(&document).expect("workbook should encode");
    assert!(v_bytes.starts_with(b"PK"));
}

#[test]
fn test_empty_payload_renders_placeholder_workbook() {
    let payload = parse_payload("{}").expect("empty payload should decode");
    let document = build_evaluation_document(&payload, &SpecRenderOptions::default());

    assert_eq!(document.sheet_names(), vec!["Export"]);
    let v_bytes = render_evaluation_workbook(&payload, &SpecRenderOptions::default())
        .expect("placeholder workbook should encode");
    assert!(v_bytes.starts_with(b"PK"));
}

#[test]
fn test_results_fill_only_their_own_form() {
    let payload = parse_payload(
        r#"{
        "schema": {"title": "Guider", "evaluationId": "W1", "description": "Scored by the guider",
                   "groups": [{"id": "G", "name": "CLO 1", "criteria": [{"id": "C1"}]}]},
        "schemas": [
            {"title": "Reviewer", "formKey": "W2",
             "groups": [{"id": "G", "name": "CLO 1", "criteria": [{"id": "C1"}]}]}
        ],
        "evaluators": [{"name": "Ana Smith'", "records": [
            {"subjectId": "S1", "result": {"evaluationId": "W2", "scores": [{"criterionId": "C1", "value": 6}]}},
            {"subjectId": "S2", "result": {"scores": [{"criterionId": "C1", "value": 4}]}}
        ]}]
    }"#,
    )
    .expect("payload should decode");
    let document = build_evaluation_document(&payload, &SpecRenderOptions::default());

    let sheet_first = &document.sheets[0];
    assert!(!sheet_first.name.ends_with('\''));
    let row_body = 17 + 4;
    assert_eq!(sheet_first.number_at(row_body, 5), None);
    assert_eq!(sheet_first.number_at(row_body, 6), Some(6.0));
    assert_eq!(sheet_first.number_at(row_body + 1, 5), Some(4.0));
    assert_eq!(sheet_first.number_at(row_body + 1, 6), Some(4.0));

    let v_bytes = render_evaluation_workbook(&payload, &SpecRenderOptions::default())
        .expect("workbook should encode");
    assert!(v_bytes.starts_with(b"PK"));
}
