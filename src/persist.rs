//! Save and restore the parameters of a model as JSON.
//!
//! The file holds the three tables as dense nested arrays, of shape (S,S), (S,V), and (S,).
//! Loading goes through the same checks as `HiddenMarkovModel::from_parameters`.
use crate::error::{Result, Table};
use crate::hmm::HiddenMarkovModel;
use crate::matrix::Matrix;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Read, Write};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub transition_probs: Vec<Vec<f64>>,
    pub emission_probs: Vec<Vec<f64>>,
    pub initial_probs: Vec<f64>,
}

impl From<&HiddenMarkovModel> for Parameters {
    fn from(model: &HiddenMarkovModel) -> Self {
        Self {
            transition_probs: model.transition_probs().to_rows(),
            emission_probs: model.emission_probs().to_rows(),
            initial_probs: model.initial_probs().to_vec(),
        }
    }
}

impl TryFrom<Parameters> for HiddenMarkovModel {
    type Error = crate::error::HmmError;
    fn try_from(params: Parameters) -> Result<Self> {
        let transition = Matrix::from_rows(&params.transition_probs, Table::Transition)?;
        let emission = Matrix::from_rows(&params.emission_probs, Table::Emission)?;
        HiddenMarkovModel::from_parameters(transition, emission, params.initial_probs)
    }
}

/// Write `value` as JSON into the writer.
pub fn write_json<W: Write, T: Serialize>(wtr: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *wtr, value)?;
    writeln!(wtr)?;
    Ok(())
}

/// Read a JSON value from the reader.
pub fn read_json<R: Read, T: serde::de::DeserializeOwned>(rdr: R) -> Result<T> {
    Ok(serde_json::from_reader(BufReader::new(rdr))?)
}

pub fn save<W: Write>(wtr: &mut W, model: &HiddenMarkovModel) -> Result<()> {
    write_json(wtr, &Parameters::from(model))
}

pub fn load<R: Read>(rdr: R) -> Result<HiddenMarkovModel> {
    let params: Parameters = read_json(rdr)?;
    HiddenMarkovModel::try_from(params)
}

pub fn save_to_file<P: AsRef<std::path::Path>>(path: P, model: &HiddenMarkovModel) -> Result<()> {
    let mut wtr = std::fs::File::create(path).map(BufWriter::new)?;
    save(&mut wtr, model)?;
    wtr.flush()?;
    Ok(())
}

pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<HiddenMarkovModel> {
    let rdr = std::fs::File::open(path)?;
    load(rdr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HmmError;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    #[test]
    fn roundtrip_test() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(42);
        let model = HiddenMarkovModel::random(3, 5, &mut rng).unwrap();
        let mut buffer = vec![];
        save(&mut buffer, &model).unwrap();
        let restored = load(buffer.as_slice()).unwrap();
        assert_eq!(model, restored);
        let params = Parameters::from(&restored);
        assert_eq!(params.transition_probs.len(), 3);
        assert!(params.transition_probs.iter().all(|r| r.len() == 3));
        assert_eq!(params.emission_probs.len(), 3);
        assert!(params.emission_probs.iter().all(|r| r.len() == 5));
        assert_eq!(params.initial_probs.len(), 3);
    }
    #[test]
    fn file_roundtrip_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(7);
        let model = HiddenMarkovModel::random(2, 4, &mut rng).unwrap();
        save_to_file(&path, &model).unwrap();
        let restored = load_from_file(&path).unwrap();
        assert_eq!(model, restored);
        let obs = [0, 3, 2, 1, 1, 0];
        assert_eq!(model.decode(&obs).unwrap(), restored.decode(&obs).unwrap());
    }
    #[test]
    fn malformed_test() {
        let ragged = r#"{"transition_probs":[[0.5,0.5],[1.0]],
            "emission_probs":[[1.0],[1.0]],"initial_probs":[0.5,0.5]}"#;
        let result = load(ragged.as_bytes());
        assert!(matches!(result, Err(HmmError::ShapeMismatch { .. })));
        let unnormalized = r#"{"transition_probs":[[0.5,0.5],[0.5,0.5]],
            "emission_probs":[[1.0],[0.9]],"initial_probs":[0.5,0.5]}"#;
        let result = load(unnormalized.as_bytes());
        assert!(matches!(
            result,
            Err(HmmError::InvalidDistribution {
                table: Table::Emission,
                row: 1,
                ..
            })
        ));
        let wrong_initial = r#"{"transition_probs":[[0.5,0.5],[0.5,0.5]],
            "emission_probs":[[1.0],[1.0]],"initial_probs":[1.0]}"#;
        let result = load(wrong_initial.as_bytes());
        assert!(matches!(
            result,
            Err(HmmError::ShapeMismatch {
                table: Table::Initial,
                ..
            })
        ));
        let empty = r#"{"transition_probs":[],"emission_probs":[],"initial_probs":[]}"#;
        let result = load(empty.as_bytes());
        assert!(matches!(result, Err(HmmError::ZeroDimension { .. })));
        assert!(matches!(load("{".as_bytes()), Err(HmmError::Json(_))));
    }
    #[test]
    fn vocabulary_roundtrip_test() {
        use crate::corpus::Vocabulary;
        let mut vocab = Vocabulary::with_unknown("<unk>");
        vocab.insert("dog");
        vocab.insert("cat");
        let mut buffer = vec![];
        write_json(&mut buffer, &vocab).unwrap();
        let restored: Vocabulary = read_json(buffer.as_slice()).unwrap();
        assert_eq!(vocab, restored);
        assert_eq!(restored.get("cat"), Some(2));
        assert_eq!(restored.get("bird"), Some(0));
    }
}
