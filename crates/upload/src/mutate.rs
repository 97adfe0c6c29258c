// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! JSON mutation pass applied to a completed upload.
//!
//! Only top-level keys are inspected:
//! - keys starting with a vowel (a, e, i, o, u; any case) are removed
//! - surviving numbers with an even integral part and no fractional part
//!   are increased by 1000
//! - everything else is copied untouched, nested values included
//!
//! Numbers are judged on their `f64` value. Beyond 2^53 every value is an
//! even integer in that representation, so they are bumped, and the
//! addition may be lost to rounding.

use crate::error::TransformError;
use serde_json::{Map, Number, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const BUMP: f64 = 1000.0;

/// `2^63`; integral results below this magnitude are emitted as integers
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Read `input` to the end, mutate it as a JSON object and write the result
/// to `output` in a single write.
///
/// Nothing is written unless the input parses as a JSON object.
pub async fn transform<R, W>(input: &mut R, output: &mut W) -> Result<(), TransformError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut contents = Vec::new();
    _ = input
        .read_to_end(&mut contents)
        .await
        .map_err(TransformError::Read)?;

    let document: Map<String, Value> =
        serde_json::from_slice(&contents).map_err(TransformError::Parse)?;

    let mutated = mutate_document(document);
    let bytes = serde_json::to_vec(&mutated).map_err(TransformError::Serialize)?;

    output
        .write_all(&bytes)
        .await
        .map_err(TransformError::Write)?;
    output.flush().await.map_err(TransformError::Write)
}

/// Apply the key-drop and numeric-bump rules to a parsed document
#[must_use]
pub fn mutate_document(document: Map<String, Value>) -> Map<String, Value> {
    document
        .into_iter()
        .filter(|(key, _)| !starts_with_vowel(key))
        .map(|(key, value)| (key, mutate_value(value)))
        .collect()
}

/// The empty key has no first letter and is kept.
fn starts_with_vowel(key: &str) -> bool {
    matches!(
        key.chars().next().map(|c| c.to_ascii_lowercase()),
        Some('a' | 'e' | 'i' | 'o' | 'u')
    )
}

fn mutate_value(value: Value) -> Value {
    match value {
        Value::Number(number) => Value::Number(bump(number)),
        Value::Null | Value::Bool(_) | Value::String(_) | Value::Array(_) | Value::Object(_) => {
            value
        }
    }
}

fn bump(number: Number) -> Number {
    let Some(value) = number.as_f64() else {
        return number;
    };
    if !is_even_integral(value) {
        return number;
    }

    let bumped = value + BUMP;
    if bumped.fract() == 0.0 && bumped.abs() < I64_LIMIT {
        // emit integral results as JSON integers: 3000, not 3000.0
        Number::from(bumped as i64)
    } else {
        Number::from_f64(bumped).unwrap_or(number)
    }
}

fn is_even_integral(value: f64) -> bool {
    value.fract() == 0.0 && value.trunc() % 2.0 == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn run(input: &str) -> Result<Value, TransformError> {
        let mut output = Vec::new();
        transform(&mut input.as_bytes(), &mut output).await?;
        Ok(serde_json::from_slice(&output).expect("output is JSON"))
    }

    #[tokio::test]
    async fn test_drops_vowels_and_bumps_even() {
        let output = run(
            r#"{"a_property":"aaaa","b_property":12309123,"b_property_even":2000,"e_prop":231231}"#,
        )
        .await
        .unwrap();

        assert_eq!(output, json!({"b_property": 12309123, "b_property_even": 3000}));
    }

    #[tokio::test]
    async fn test_fractional_value_unbumped() {
        let output = run(
            r#"{"a_property":"aaaa","b_property":12309123,"b_property_even":2000.5,"e_prop":231231}"#,
        )
        .await
        .unwrap();

        assert_eq!(output, json!({"b_property": 12309123, "b_property_even": 2000.5}));
    }

    #[tokio::test]
    async fn test_malformed_input_writes_nothing() {
        let mut output = Vec::new();
        let err = transform(&mut "gibberish invalid json".as_bytes(), &mut output)
            .await
            .unwrap_err();

        match err {
            TransformError::Parse(e) => {
                assert_eq!(e.line(), 1);
                assert!(e.column() > 0);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_top_level_rejected() {
        for input in ["[1, 2, 3]", "42", "\"text\"", "null"] {
            let mut output = Vec::new();
            let err = transform(&mut input.as_bytes(), &mut output)
                .await
                .unwrap_err();
            assert!(matches!(err, TransformError::Parse(_)), "input {input}");
            assert!(output.is_empty());
        }
    }

    #[tokio::test]
    async fn test_vowel_keys_dropped_regardless_of_type_or_case() {
        let output = run(
            r#"{"apple":1,"Egg":"x","ice":null,"Orange":[1,2],"umbrella":{"k":2},"ok":true,"Kiwi":false}"#,
        )
        .await
        .unwrap();

        assert_eq!(output, json!({"Kiwi": false}));
    }

    #[tokio::test]
    async fn test_non_numbers_and_nested_values_untouched() {
        let output = run(
            r#"{"s":"2000","b":true,"n":null,"list":[2,4],"map":{"even":2,"apple":1},"obj":{"k":2}}"#,
        )
        .await
        .unwrap();

        assert_eq!(
            output,
            json!({"s": "2000", "b": true, "n": null, "list": [2, 4], "map": {"even": 2, "apple": 1}})
        );
        assert!(output.get("obj").is_none());
    }

    #[tokio::test]
    async fn test_numeric_edge_cases() {
        let output = run(
            r#"{"zero":0,"neg_even":-2,"neg_odd":-3,"neg_frac":-2.5,"float_even":4.0,"seven":7,"odd":8,"tiny":0.25}"#,
        )
        .await
        .unwrap();

        assert_eq!(
            output,
            json!({
                "zero": 1000,
                "neg_even": 998,
                "neg_odd": -3,
                "neg_frac": -2.5,
                "float_even": 1004,
                "seven": 7,
                "tiny": 0.25
            })
        );
    }

    #[tokio::test]
    async fn test_large_numbers_follow_float_evenness() {
        // 2^53 + 1 is not representable; as f64 it reads back as the even 2^53
        let output = run(r#"{"big":9007199254740993,"huge":1e300}"#).await.unwrap();

        assert_eq!(output["big"].as_f64(), Some(9_007_199_254_740_992.0 + 1000.0));
        assert_eq!(output["huge"].as_f64(), Some(1e300));
    }

    #[tokio::test]
    async fn test_bump_across_exact_float_range_stays_integer() {
        let mut output = Vec::new();
        transform(&mut r#"{"n":9007199254740000}"#.as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(output, br#"{"n":9007199254741000}"#);
    }

    #[tokio::test]
    async fn test_empty_key_kept() {
        let output = run(r#"{"":2,"a":2}"#).await.unwrap();
        assert_eq!(output, json!({"": 1002}));
    }

    #[tokio::test]
    async fn test_empty_object() {
        let output = run("{}").await.unwrap();
        assert_eq!(output, json!({}));
    }

    #[tokio::test]
    async fn test_idempotent_output() {
        let input = r#"{"z":2,"y":"text","a":1,"m":{"x":[1,2]},"c":3.5}"#;

        let mut first = Vec::new();
        transform(&mut input.as_bytes(), &mut first).await.unwrap();
        let mut second = Vec::new();
        transform(&mut input.as_bytes(), &mut second).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_read_failure() {
        let mut input = tokio_test::io::Builder::new()
            .read_error(std::io::Error::other("device gone"))
            .build();
        let mut output = Vec::new();

        let err = transform(&mut input, &mut output).await.unwrap_err();

        assert!(matches!(err, TransformError::Read(_)));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure() {
        let mut output = tokio_test::io::Builder::new()
            .write_error(std::io::Error::other("disk full"))
            .build();

        let err = transform(&mut "{\"b\":1}".as_bytes(), &mut output)
            .await
            .unwrap_err();

        assert!(matches!(err, TransformError::Write(_)));
    }

    #[test]
    fn test_starts_with_vowel() {
        assert!(starts_with_vowel("apple"));
        assert!(starts_with_vowel("Umbrella"));
        assert!(!starts_with_vowel("banana"));
        assert!(!starts_with_vowel(""));
        assert!(!starts_with_vowel("_a"));
        assert!(!starts_with_vowel("ébène"));
    }
}
