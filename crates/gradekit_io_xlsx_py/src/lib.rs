use std::path::PathBuf;

use gradekit_io_xlsx::{
    DocumentSink, ExportError, XlsxWriter, build_evaluation_document, parse_payload,
    parse_render_options, suggested_file_name as rs_suggested_file_name,
};
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "gradekit.xlsx.evaluation.v1";
const C_BRIDGE_TRANSPORT: &str = "json";

fn map_export_error(exception: ExportError) -> PyErr {
    match exception {
        ExportError::InvalidPayload(message) => PyValueError::new_err(message),
        ExportError::Io { path, message } => {
            PyOSError::new_err(format!("Failed to write {}: {message}", path.display()))
        }
        other @ (ExportError::IndexOverflow(_) | ExportError::Xlsx(_)) => {
            PyRuntimeError::new_err(other.to_string())
        }
    }
}

/// Render the evaluation workbook and return it as `bytes`.
#[pyfunction(name = "render_evaluation_workbook")]
#[pyo3(signature = (payload_json, options_json = None))]
fn render_evaluation_workbook_py<'py>(
    py: Python<'py>,
    payload_json: &str,
    options_json: Option<&str>,
) -> PyResult<Bound<'py, PyBytes>> {
    let payload = parse_payload(payload_json).map_err(map_export_error)?;
    let cfg_options = parse_render_options(options_json).map_err(map_export_error)?;

    let v_bytes = py.allow_threads(|| {
        let document = build_evaluation_document(&payload, &cfg_options);
        XlsxWriter::new(&cfg_options.style).serialize(&document)
    });
    let v_bytes = v_bytes.map_err(map_export_error)?;
    Ok(PyBytes::new(py, &v_bytes))
}

/// Render the evaluation workbook to `file_out`; returns the sheet names.
#[pyfunction(name = "write_evaluation_workbook")]
#[pyo3(signature = (payload_json, file_out, options_json = None))]
fn write_evaluation_workbook_py(
    py: Python<'_>,
    payload_json: &str,
    file_out: String,
    options_json: Option<&str>,
) -> PyResult<Vec<String>> {
    let payload = parse_payload(payload_json).map_err(map_export_error)?;
    let cfg_options = parse_render_options(options_json).map_err(map_export_error)?;
    let path_file_out = PathBuf::from(file_out);

    let l_sheet_names = py.allow_threads(|| {
        let document = build_evaluation_document(&payload, &cfg_options);
        XlsxWriter::new(&cfg_options.style)
            .save(&document, &path_file_out)
            .map(|_| document.sheet_names())
    });
    l_sheet_names.map_err(map_export_error)
}

/// Suggested output file name for the given options.
#[pyfunction(name = "suggested_file_name")]
#[pyo3(signature = (options_json = None))]
fn suggested_file_name_py(options_json: Option<&str>) -> PyResult<String> {
    let cfg_options = parse_render_options(options_json).map_err(map_export_error)?;
    Ok(rs_suggested_file_name(&cfg_options))
}

#[pymodule]
fn _gradekit_io_xlsx_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(render_evaluation_workbook_py, module)?)?;
    module.add_function(wrap_pyfunction!(write_evaluation_workbook_py, module)?)?;
    module.add_function(wrap_pyfunction!(suggested_file_name_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
