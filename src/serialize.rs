//! serde helpers that keep brain snapshots in their nested-array shape:
//! weights as one array per input row, biases and activations as flat arrays.

use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize_rows<S: Serializer>(
    matrix: &Matrix<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let rows: Vec<&[f64]> = if matrix.cols() == 0 {
        vec![&[][..]; matrix.rows()]
    } else {
        matrix.data().chunks(matrix.cols()).collect()
    };

    rows.serialize(serializer)
}

pub fn deserialize_rows<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Matrix<f64>, D::Error> {
    let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
    let cols = rows.first().map_or(0, Vec::len);
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(D::Error::custom(format!(
            "ragged weights: row {idx} has {} values, expected {cols}",
            row.len()
        )));
    }

    let n = rows.len();
    Ok(Matrix::new(n, cols, rows.into_iter().flatten().collect::<Vec<_>>()))
}

pub fn serialize_flat<S: Serializer>(
    matrix: &Matrix<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    matrix.data().serialize(serializer)
}

pub fn deserialize_flat<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Matrix<f64>, D::Error> {
    Vec::<f64>::deserialize(deserializer).map(|v| Matrix::new(1, v.len(), v))
}

/// Activation buffers of a network that never ran are exported as `null`s
pub fn deserialize_activations<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<f64>, D::Error> {
    Vec::<Option<f64>>::deserialize(deserializer)
        .map(|v| v.into_iter().map(Option::unwrap_or_default).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrap {
        #[serde(serialize_with = "serialize_rows", deserialize_with = "deserialize_rows")]
        w: Matrix<f64>,
        #[serde(default, deserialize_with = "deserialize_activations")]
        a: Vec<f64>,
    }

    #[test]
    fn test_rows_keep_shape() {
        let wrap = Wrap {
            w: Matrix::new(2, 3, vec![1., 2., 3., 4., 5., 6.]),
            a: vec![],
        };
        let s = serde_json::to_string(&wrap).unwrap();
        assert!(s.contains("[[1.0,2.0,3.0],[4.0,5.0,6.0]]"), "{s}");

        let back: Wrap = serde_json::from_str(&s).unwrap();
        assert_eq!(2, back.w.rows());
        assert_eq!(3, back.w.cols());
        assert_eq!(wrap.w, back.w);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = serde_json::from_str::<Wrap>(r#"{"w":[[1.0,2.0],[3.0]]}"#).unwrap_err();
        assert!(err.to_string().contains("ragged"), "{err}");
    }

    #[test]
    fn test_null_activations() {
        let wrap: Wrap = serde_json::from_str(r#"{"w":[[1.0]],"a":[null,0.5,null]}"#).unwrap();
        assert_eq!(vec![0., 0.5, 0.], wrap.a);
    }
}
