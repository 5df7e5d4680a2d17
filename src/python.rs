use crate::block::BlockRegistry;
use crate::events::EventFormatter;
use crate::generator::javascript;
use crate::layout::ViewportMetrics;
use crate::options::WorkspaceOptions;
use crate::render::svg;
use crate::workspace::{DisplayWorkspace, Workspace};
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
}

fn runtime_error(e: impl std::fmt::Display) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
}

impl<'py> IntoPyObject<'py> for ViewportMetrics {
    type Target = PyDict;
    type Output = Bound<'py, Self::Target>;
    type Error = PyErr;

    fn into_pyobject(self, py: Python<'py>) -> Result<Self::Output, Self::Error> {
        let dict = PyDict::new(py);
        dict.set_item("scale", self.scale)?;
        dict.set_item("view_top", self.view.top)?;
        dict.set_item("view_left", self.view.left)?;
        dict.set_item("view_width", self.view.width())?;
        dict.set_item("view_height", self.view.height())?;
        dict.set_item("content_width", self.content.width())?;
        dict.set_item("content_height", self.content.height())?;
        Ok(dict)
    }
}

/// A block workspace loaded with the standard block library.
///
/// Blocks are loaded from and saved to the JSON workspace format. Layout and
/// viewport operations queue change events, which `flush` delivers and returns
/// as formatted strings.
#[pyclass(name = "Workspace", unsendable)]
struct WorkspacePy {
    workspace: Workspace,
}

#[pymethods]
impl WorkspacePy {
    /// Creates an empty workspace.
    ///
    /// Args:
    ///     options_json (str | None): Workspace options as JSON. Omitted keys
    ///         keep their defaults.
    ///
    /// Raises:
    ///     ValueError: If the options cannot be parsed.
    #[new]
    #[pyo3(signature = (options_json=None))]
    fn new(options_json: Option<&str>) -> PyResult<Self> {
        let options = match options_json {
            Some(json) => serde_json::from_str::<WorkspaceOptions>(json).map_err(value_error)?,
            None => WorkspaceOptions::default(),
        };
        let registry = BlockRegistry::with_standard_library().map_err(runtime_error)?;
        let workspace = Workspace::builder(registry).with_options(options).build();
        Ok(WorkspacePy { workspace })
    }

    /// Replaces the contents with a saved workspace. Returns the number of stacks.
    ///
    /// Raises:
    ///     ValueError: If the JSON is malformed or references unknown block types,
    ///         inputs or fields.
    fn load_json(&mut self, json: &str) -> PyResult<usize> {
        self.workspace
            .load_json(json)
            .map(|ids| ids.len())
            .map_err(value_error)
    }

    fn save_json(&self) -> String {
        self.workspace.save_json()
    }

    /// Arranges the movable stacks in one column.
    fn cleanup(&mut self) {
        self.workspace.cleanup();
    }

    fn set_scale(&mut self, scale: f64) -> PyResult<()> {
        self.workspace.set_scale(scale).map_err(runtime_error)
    }

    fn zoom_to_fit(&mut self) -> PyResult<()> {
        self.workspace.zoom_to_fit().map_err(runtime_error)
    }

    fn metrics(&self) -> ViewportMetrics {
        self.workspace.metrics()
    }

    /// Runs pending tasks and returns the delivered events, one line each.
    fn flush(&mut self) -> Vec<String> {
        self.workspace
            .flush()
            .iter()
            .map(EventFormatter::format)
            .collect()
    }

    fn to_svg(&self) -> String {
        svg::export(&self.workspace)
    }

    /// Generates JavaScript for every stack.
    ///
    /// Raises:
    ///     RuntimeError: If a block has no emitter.
    fn to_javascript(&self) -> PyResult<String> {
        javascript::builder()
            .build()
            .workspace_to_code(&self.workspace)
            .map_err(runtime_error)
    }

    fn __str__(&self) -> String {
        DisplayWorkspace::new(&self.workspace).to_string()
    }
}

/// Python bindings to the kumiki block workspace engine.
#[pymodule]
fn kumiki(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<WorkspacePy>()?;
    Ok(())
}
