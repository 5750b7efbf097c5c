//! Serialized key -> tensor dictionary.
//!
//! A tensor is either a bare JSON number (a scalar) or an object with a
//! row-major `data` array and its `shape`:
//!
//! ```json
//! { "sigma": -2.3, "vertex_weight": { "dtype": "float32", "shape": [4, 1], "data": [0, 1, 2, 3] } }
//! ```

use crate::checkpoint::LoadError;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Element type tag. Values are carried as `f64` regardless; the tag only
/// decides which conversions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    #[default]
    Float32,
    Float64,
    Int32,
    Int64,
    Uint8,
}

impl DType {
    pub fn is_integer(self) -> bool {
        matches!(self, DType::Int32 | DType::Int64 | DType::Uint8)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTensor {
    Scalar(f64),
    Dense {
        #[serde(default)]
        dtype: DType,
        shape: Vec<usize>,
        data: Vec<f64>,
    },
}

/// A dense, row-major tensor held in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl<'de> Deserialize<'de> for Tensor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawTensor::deserialize(deserializer)? {
            RawTensor::Scalar(value) => Ok(Tensor::scalar(value)),
            RawTensor::Dense { dtype, shape, data } => {
                Tensor::new(dtype, shape, data).map_err(de::Error::custom)
            }
        }
    }
}

impl Serialize for Tensor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawTensor::Dense {
            dtype: self.dtype,
            shape: self.shape.clone(),
            data: self.data.clone(),
        }
        .serialize(serializer)
    }
}

impl Tensor {
    /// Create a zero-dimensional tensor.
    pub fn scalar(value: f64) -> Self {
        Self {
            dtype: DType::Float64,
            shape: Vec::new(),
            data: vec![value],
        }
    }

    /// Create a tensor, checking that `data` fills `shape`.
    pub fn new(dtype: DType, shape: Vec<usize>, data: Vec<f64>) -> Result<Self, String> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| format!("shape {:?} overflows the addressable element count", shape))?;
        if expected != data.len() {
            return Err(format!(
                "shape {:?} needs {} elements but data has {}",
                shape,
                expected,
                data.len()
            ));
        }
        Ok(Self { dtype, shape, data })
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Named tensors read from a checkpoint file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TensorDict {
    tensors: HashMap<String, Tensor>,
}

impl TensorDict {
    /// Parse a dictionary from any reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, LoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read a dictionary from a file on disk.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn get(&self, key: &str) -> Option<&Tensor> {
        self.tensors.get(key)
    }

    /// Fetch a required entry.
    pub fn require(&self, key: &'static str) -> Result<&Tensor, LoadError> {
        self.get(key).ok_or(LoadError::MissingField(key))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}
