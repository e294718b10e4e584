use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Text to embed: either one string or an ordered batch of strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged, expecting = "a string or an array of strings")]
pub enum Inputs {
    Single(String),
    Many(Vec<String>),
}

impl Inputs {
    /// Canonical batch form handed to the provider.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Inputs::Single(text) => vec![text],
            Inputs::Many(texts) => texts,
        }
    }
}

impl From<&str> for Inputs {
    fn from(text: &str) -> Self {
        Inputs::Single(text.to_owned())
    }
}

impl From<Vec<String>> for Inputs {
    fn from(texts: Vec<String>) -> Self {
        Inputs::Many(texts)
    }
}

#[derive(Debug, Serialize)]
pub struct EmbedRequest {
    pub inputs: Inputs,
}

// Only a JSON object is a request; the derived impl would also take `["text"]`.
impl<'de> Deserialize<'de> for EmbedRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RequestVisitor;

        impl<'de> Visitor<'de> for RequestVisitor {
            type Value = EmbedRequest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object with an `inputs` key")
            }

            fn visit_map<A>(self, mut map: A) -> Result<EmbedRequest, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut inputs = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "inputs" {
                        if inputs.is_some() {
                            return Err(de::Error::duplicate_field("inputs"));
                        }
                        inputs = Some(map.next_value()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }

                let inputs = inputs.ok_or_else(|| de::Error::missing_field("inputs"))?;
                Ok(EmbedRequest { inputs })
            }
        }

        deserializer.deserialize_map(RequestVisitor)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_string_is_wrapped() {
        let req: EmbedRequest = serde_json::from_str(r#"{"inputs": "hello world"}"#).unwrap();
        assert_eq!(req.inputs, Inputs::Single("hello world".to_owned()));
        assert_eq!(req.inputs.into_vec(), vec!["hello world".to_owned()]);
    }

    #[test]
    fn sequence_passes_through_in_order() {
        let req: EmbedRequest = serde_json::from_str(r#"{"inputs": ["b", "a", "b"]}"#).unwrap();
        assert_eq!(req.inputs.into_vec(), vec!["b", "a", "b"]);
    }

    #[test]
    fn empty_sequence_is_accepted() {
        let req: EmbedRequest = serde_json::from_str(r#"{"inputs": []}"#).unwrap();
        assert!(req.inputs.into_vec().is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let req: EmbedRequest =
            serde_json::from_str(r#"{"inputs": "x", "model": "whatever", "n": 3}"#).unwrap();
        assert_eq!(req.inputs.into_vec(), vec!["x"]);
    }

    #[test]
    fn missing_inputs_is_rejected() {
        let err = serde_json::from_str::<EmbedRequest>(r#"{"texts": ["a"]}"#).unwrap_err();
        assert!(err.is_data());
        assert!(err.to_string().contains("missing field `inputs`"));
    }

    #[test]
    fn only_objects_are_requests() {
        for body in [r#"["hello"]"#, r#"[["a", "b"]]"#, r#""hello""#, "null"] {
            let err = serde_json::from_str::<EmbedRequest>(body).unwrap_err();
            assert!(err.is_data(), "body: {body}");
            assert!(err.to_string().contains("an object with an `inputs` key"));
        }
    }

    #[test]
    fn duplicate_inputs_is_rejected() {
        let err =
            serde_json::from_str::<EmbedRequest>(r#"{"inputs": "a", "inputs": "b"}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate field `inputs`"));
    }

    #[test]
    fn non_string_elements_are_rejected() {
        let err = serde_json::from_str::<EmbedRequest>(r#"{"inputs": ["a", 1]}"#).unwrap_err();
        assert!(err.to_string().contains("a string or an array of strings"));

        assert!(serde_json::from_str::<EmbedRequest>(r#"{"inputs": 42}"#).is_err());
        assert!(serde_json::from_str::<EmbedRequest>(r#"{"inputs": null}"#).is_err());
    }

    #[test]
    fn response_has_only_embeddings_key() {
        let body = serde_json::to_value(EmbedResponse {
            embeddings: vec![vec![0.5, -1.0]],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "embeddings": [[0.5, -1.0]] }));
    }
}
