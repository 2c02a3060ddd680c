//! Saving and loading scenarios.
//!
//! Generic over `Write`/`Read` so tests can use `Vec<u8>` and `&[u8]`;
//! the path helpers wrap files in buffered I/O.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::codec::{decode_scenario, encode_scenario};
use crate::error::ScenarioError;
use crate::types::Scenario;

/// Write `scenario` in the binary format.
///
/// # Examples
///
/// ```
/// use basinflow_core::{HeatFlowModel, Layer, ModelState};
/// use basinflow_scenario::{load, save, Scenario};
///
/// let model = ModelState::new(
///     vec![Layer::new("shale", 10.0, 0.0, 500.0, "shale")],
///     HeatFlowModel::Constant(60.0),
/// );
/// let scenario = Scenario::new("base case", model);
///
/// let mut buf = Vec::new();
/// save(&scenario, &mut buf).unwrap();
/// let loaded = load(buf.as_slice()).unwrap();
/// assert_eq!(loaded, scenario);
/// ```
pub fn save<W: Write>(scenario: &Scenario, mut writer: W) -> Result<(), ScenarioError> {
    encode_scenario(&mut writer, scenario)?;
    writer.flush()?;
    Ok(())
}

/// Read a scenario written by [`save`], verifying its result hash.
pub fn load<R: Read>(mut reader: R) -> Result<Scenario, ScenarioError> {
    decode_scenario(&mut reader)
}

/// [`save`] to a file, replacing it if it exists.
pub fn save_to_path(scenario: &Scenario, path: impl AsRef<Path>) -> Result<(), ScenarioError> {
    let file = File::create(path)?;
    save(scenario, BufWriter::new(file))
}

/// [`load`] from a file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let file = File::open(path)?;
    load(BufReader::new(file))
}
