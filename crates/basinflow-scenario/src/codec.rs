//! Binary encode/decode for the scenario format.
//!
//! All integers and floats are little-endian. Strings are length-prefixed
//! with a `u32` byte count, sequences with a `u32` element count. Optional
//! values carry a `u8` presence flag. Enums are a `u8` tag.
//!
//! ```text
//! [MAGIC "BFSC"] [VERSION u8] [name] [model]
//! [has_result u8] ([result hash u64] [result])?
//! ```

use std::io::{self, Read, Write};

use basinflow_core::{
    AgeSeries, CompactionModel, CompactionParams, ControlPoint, DepthInterval, HeatFlowModel,
    KerogenType, Layer, LayerSummary, LayerTable, Lithology, ModelState, ResultData, ResultMeta,
    SimulationResult, SourceRock, ThermalProps,
};

use crate::error::ScenarioError;
use crate::hash::result_hash;
use crate::types::Scenario;
use crate::{FORMAT_VERSION, MAGIC};

/// Upper bound on any decoded length prefix.
///
/// Rejects corrupt prefixes before they turn into huge allocations.
pub const MAX_LENGTH: usize = 1 << 28;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), ScenarioError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), ScenarioError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), ScenarioError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), ScenarioError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a `u32` length prefix.
pub fn write_len(w: &mut dyn Write, len: usize) -> Result<(), ScenarioError> {
    let len = u32::try_from(len).map_err(|_| ScenarioError::Malformed {
        detail: format!("length {len} does not fit in u32"),
    })?;
    write_u32_le(w, len)
}

/// Write a length-prefixed UTF-8 string.
pub fn write_str(w: &mut dyn Write, s: &str) -> Result<(), ScenarioError> {
    write_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn write_optional_f64(w: &mut dyn Write, v: Option<f64>) -> Result<(), ScenarioError> {
    match v {
        Some(v) => {
            write_u8(w, 1)?;
            write_f64_le(w, v)
        }
        None => write_u8(w, 0),
    }
}

// ── Primitive readers ───────────────────────────────────────────

fn read_exact(r: &mut dyn Read, buf: &mut [u8]) -> Result<(), ScenarioError> {
    r.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ScenarioError::Malformed {
                detail: "unexpected end of data".to_string(),
            }
        } else {
            ScenarioError::Io(e)
        }
    })
}

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, ScenarioError> {
    let mut buf = [0u8; 1];
    read_exact(r, &mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, ScenarioError> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, ScenarioError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, ScenarioError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a `u32` length prefix, rejecting values above [`MAX_LENGTH`].
pub fn read_len(r: &mut dyn Read) -> Result<usize, ScenarioError> {
    let len = read_u32_le(r)? as usize;
    if len > MAX_LENGTH {
        return Err(ScenarioError::Malformed {
            detail: format!("length prefix {len} exceeds {MAX_LENGTH}"),
        });
    }
    Ok(len)
}

/// Read a length-prefixed UTF-8 string.
pub fn read_str(r: &mut dyn Read) -> Result<String, ScenarioError> {
    let len = read_len(r)?;
    // Grow with the data actually present, not with the prefix.
    let mut buf = Vec::new();
    let read = Read::take(&mut *r, len as u64).read_to_end(&mut buf)?;
    if read != len {
        return Err(ScenarioError::Malformed {
            detail: format!("string of {len} bytes truncated after {read}"),
        });
    }
    String::from_utf8(buf).map_err(|e| ScenarioError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

fn read_flag(r: &mut dyn Read, what: &'static str) -> Result<bool, ScenarioError> {
    match read_u8(r)? {
        0 => Ok(false),
        1 => Ok(true),
        tag => Err(ScenarioError::UnknownTag { kind: what, tag }),
    }
}

fn read_optional_f64(r: &mut dyn Read) -> Result<Option<f64>, ScenarioError> {
    Ok(if read_flag(r, "presence flag")? {
        Some(read_f64_le(r)?)
    } else {
        None
    })
}

// ── Enum tags ───────────────────────────────────────────────────

fn kerogen_tag(k: KerogenType) -> u8 {
    match k {
        KerogenType::TypeI => 1,
        KerogenType::TypeII => 2,
        KerogenType::TypeIII => 3,
    }
}

fn kerogen_from_tag(tag: u8) -> Result<KerogenType, ScenarioError> {
    match tag {
        1 => Ok(KerogenType::TypeI),
        2 => Ok(KerogenType::TypeII),
        3 => Ok(KerogenType::TypeIII),
        tag => Err(ScenarioError::UnknownTag {
            kind: "kerogen type",
            tag,
        }),
    }
}

fn compaction_tag(m: CompactionModel) -> u8 {
    match m {
        CompactionModel::Exponential => 0,
        CompactionModel::Incompressible => 1,
    }
}

fn compaction_from_tag(tag: u8) -> Result<CompactionModel, ScenarioError> {
    match tag {
        0 => Ok(CompactionModel::Exponential),
        1 => Ok(CompactionModel::Incompressible),
        tag => Err(ScenarioError::UnknownTag {
            kind: "compaction model",
            tag,
        }),
    }
}

const HEAT_FLOW_CONSTANT: u8 = 0;
const HEAT_FLOW_SERIES: u8 = 1;

// ── Model ───────────────────────────────────────────────────────

fn encode_layer(w: &mut dyn Write, layer: &Layer) -> Result<(), ScenarioError> {
    write_str(w, layer.id.as_str())?;
    write_f64_le(w, layer.age_start)?;
    write_f64_le(w, layer.age_end)?;
    write_f64_le(w, layer.thickness)?;
    write_str(w, layer.lithology.name())?;

    let source = &layer.source_rock;
    write_u8(w, source.is_source as u8)?;
    write_f64_le(w, source.toc)?;
    write_f64_le(w, source.hi)?;
    write_u8(w, kerogen_tag(source.kerogen_type))?;

    match &layer.thermal {
        Some(t) => {
            write_u8(w, 1)?;
            write_f64_le(w, t.conductivity)?;
            write_f64_le(w, t.radiogenic_heat)?;
            write_f64_le(w, t.heat_capacity)?;
        }
        None => write_u8(w, 0)?,
    }
    match &layer.compaction {
        Some(c) => {
            write_u8(w, 1)?;
            write_u8(w, compaction_tag(c.model))?;
            write_f64_le(w, c.phi0)?;
            write_f64_le(w, c.c)?;
        }
        None => write_u8(w, 0)?,
    }
    Ok(())
}

fn decode_layer(r: &mut dyn Read) -> Result<Layer, ScenarioError> {
    let id = read_str(r)?;
    let age_start = read_f64_le(r)?;
    let age_end = read_f64_le(r)?;
    let thickness = read_f64_le(r)?;
    let lithology = Lithology::from_name(&read_str(r)?);
    let mut layer = Layer::new(id, age_start, age_end, thickness, lithology);

    layer.source_rock = SourceRock {
        is_source: read_flag(r, "source flag")?,
        toc: read_f64_le(r)?,
        hi: read_f64_le(r)?,
        kerogen_type: kerogen_from_tag(read_u8(r)?)?,
    };
    if read_flag(r, "thermal flag")? {
        layer.thermal = Some(ThermalProps {
            conductivity: read_f64_le(r)?,
            radiogenic_heat: read_f64_le(r)?,
            heat_capacity: read_f64_le(r)?,
        });
    }
    if read_flag(r, "compaction flag")? {
        layer.compaction = Some(CompactionParams {
            model: compaction_from_tag(read_u8(r)?)?,
            phi0: read_f64_le(r)?,
            c: read_f64_le(r)?,
        });
    }
    Ok(layer)
}

/// Encode a model state.
pub fn encode_model(w: &mut dyn Write, model: &ModelState) -> Result<(), ScenarioError> {
    write_len(w, model.stratigraphy.len())?;
    for layer in &model.stratigraphy {
        encode_layer(w, layer)?;
    }
    match &model.heat_flow {
        HeatFlowModel::Constant(v) => {
            write_u8(w, HEAT_FLOW_CONSTANT)?;
            write_f64_le(w, *v)?;
        }
        HeatFlowModel::Series(series) => {
            write_u8(w, HEAT_FLOW_SERIES)?;
            write_len(w, series.points().len())?;
            for p in series.points() {
                write_f64_le(w, p.age)?;
                write_f64_le(w, p.value)?;
            }
        }
    }
    Ok(())
}

/// Decode a model state.
///
/// The model is not validated beyond what the format itself requires;
/// the orchestrator validates it before any run.
pub fn decode_model(r: &mut dyn Read) -> Result<ModelState, ScenarioError> {
    let count = read_len(r)?;
    let mut stratigraphy = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        stratigraphy.push(decode_layer(r)?);
    }
    let heat_flow = match read_u8(r)? {
        HEAT_FLOW_CONSTANT => HeatFlowModel::Constant(read_f64_le(r)?),
        HEAT_FLOW_SERIES => {
            let n = read_len(r)?;
            let mut points = Vec::with_capacity(n.min(1024));
            for _ in 0..n {
                points.push(ControlPoint {
                    age: read_f64_le(r)?,
                    value: read_f64_le(r)?,
                });
            }
            let series =
                AgeSeries::new(points).map_err(|detail| ScenarioError::Malformed { detail })?;
            HeatFlowModel::Series(series)
        }
        tag => {
            return Err(ScenarioError::UnknownTag {
                kind: "heat flow",
                tag,
            })
        }
    };
    Ok(ModelState::new(stratigraphy, heat_flow))
}

// ── Result ──────────────────────────────────────────────────────

fn encode_summary(w: &mut dyn Write, layer: &LayerSummary) -> Result<(), ScenarioError> {
    write_str(w, layer.id.as_str())?;
    write_str(w, layer.lithology.name())?;
    write_f64_le(w, layer.age_start)?;
    write_f64_le(w, layer.age_end)?;
    write_f64_le(w, layer.thickness)?;
    write_u8(w, layer.kerogen_type.map_or(0, kerogen_tag))
}

fn decode_summary(r: &mut dyn Read) -> Result<LayerSummary, ScenarioError> {
    Ok(LayerSummary {
        id: read_str(r)?.into(),
        lithology: Lithology::from_name(&read_str(r)?),
        age_start: read_f64_le(r)?,
        age_end: read_f64_le(r)?,
        thickness: read_f64_le(r)?,
        kerogen_type: match read_u8(r)? {
            0 => None,
            tag => Some(kerogen_from_tag(tag)?),
        },
    })
}

fn table<T>(
    layers: usize,
    steps: usize,
    cells: Vec<T>,
) -> Result<LayerTable<T>, ScenarioError> {
    LayerTable::from_cells(layers, steps, cells).map_err(|detail| ScenarioError::Malformed { detail })
}

/// Encode a result. Table sizes follow from the layer and step counts.
pub fn encode_result(w: &mut dyn Write, result: &SimulationResult) -> Result<(), ScenarioError> {
    let meta = result.meta();
    write_len(w, meta.layers.len())?;
    for layer in &meta.layers {
        encode_summary(w, layer)?;
    }
    let steps = result.time_steps();
    write_len(w, steps.len())?;
    for &age in steps {
        write_f64_le(w, age)?;
    }

    let d = result.data();
    for cell in d.burial.cells() {
        match cell {
            Some(interval) => {
                write_u8(w, 1)?;
                write_f64_le(w, interval.top)?;
                write_f64_le(w, interval.bottom)?;
            }
            None => write_u8(w, 0)?,
        }
    }
    for t in [&d.porosity, &d.temperature, &d.maturity] {
        for &cell in t.cells() {
            write_optional_f64(w, cell)?;
        }
    }
    for t in [&d.transformation, &d.generation, &d.expulsion] {
        for &cell in t.cells() {
            write_f64_le(w, cell)?;
        }
    }
    Ok(())
}

/// Decode a result and check its shape.
pub fn decode_result(r: &mut dyn Read) -> Result<SimulationResult, ScenarioError> {
    let n_layers = read_len(r)?;
    let mut layers = Vec::with_capacity(n_layers.min(1024));
    for _ in 0..n_layers {
        layers.push(decode_summary(r)?);
    }
    let n_steps = read_len(r)?;
    let mut time_steps = Vec::with_capacity(n_steps.min(1 << 16));
    for _ in 0..n_steps {
        time_steps.push(read_f64_le(r)?);
    }
    let cells = n_layers
        .checked_mul(n_steps)
        .filter(|&c| c <= MAX_LENGTH)
        .ok_or_else(|| ScenarioError::Malformed {
            detail: format!("{n_layers} x {n_steps} cells exceeds {MAX_LENGTH}"),
        })?;

    let mut burial = Vec::with_capacity(cells.min(1 << 16));
    for _ in 0..cells {
        burial.push(if read_flag(r, "presence flag")? {
            Some(DepthInterval {
                top: read_f64_le(r)?,
                bottom: read_f64_le(r)?,
            })
        } else {
            None
        });
    }
    let mut optional = || -> Result<LayerTable<Option<f64>>, ScenarioError> {
        let values = (0..cells)
            .map(|_| read_optional_f64(r))
            .collect::<Result<Vec<_>, _>>()?;
        table(n_layers, n_steps, values)
    };
    let porosity = optional()?;
    let temperature = optional()?;
    let maturity = optional()?;
    let mut plain = || -> Result<LayerTable<f64>, ScenarioError> {
        let values = (0..cells)
            .map(|_| read_f64_le(r))
            .collect::<Result<Vec<_>, _>>()?;
        table(n_layers, n_steps, values)
    };
    let transformation = plain()?;
    let generation = plain()?;
    let expulsion = plain()?;

    let data = ResultData {
        time_steps,
        burial: table(n_layers, n_steps, burial)?,
        porosity,
        temperature,
        maturity,
        transformation,
        generation,
        expulsion,
    };
    SimulationResult::new(ResultMeta { layers }, data).map_err(|e| ScenarioError::Malformed {
        detail: e.to_string(),
    })
}

// ── Scenario ────────────────────────────────────────────────────

/// Encode a complete scenario, header included.
pub fn encode_scenario(w: &mut dyn Write, scenario: &Scenario) -> Result<(), ScenarioError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_str(w, &scenario.name)?;
    encode_model(w, &scenario.model)?;
    match scenario.result() {
        Some(result) => {
            write_u8(w, 1)?;
            write_u64_le(w, result_hash(result))?;
            encode_result(w, result)?;
        }
        None => write_u8(w, 0)?,
    }
    Ok(())
}

/// Decode a complete scenario, verifying magic, version and result hash.
pub fn decode_scenario(r: &mut dyn Read) -> Result<Scenario, ScenarioError> {
    let mut magic = [0u8; 4];
    read_exact(r, &mut magic)?;
    if magic != MAGIC {
        return Err(ScenarioError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(ScenarioError::UnsupportedVersion { found: version });
    }
    let name = read_str(r)?;
    let model = decode_model(r)?;
    let mut scenario = Scenario::new(name, model);
    if read_flag(r, "result flag")? {
        let recorded = read_u64_le(r)?;
        let result = decode_result(r)?;
        let computed = result_hash(&result);
        if computed != recorded {
            return Err(ScenarioError::HashMismatch { recorded, computed });
        }
        scenario.set_result(result);
    }

    let mut trailing = [0u8; 1];
    if r.read(&mut trailing)? != 0 {
        return Err(ScenarioError::Malformed {
            detail: "trailing bytes after scenario".to_string(),
        });
    }
    Ok(scenario)
}
