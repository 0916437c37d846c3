use crate::error::ContentError;
use serde::Deserialize;

const CAT_ENDPOINT: &str = "https://aws.random.cat/meow";
const INSULT_ENDPOINT: &str = "https://evilinsult.com/generate_insult.php?lang=en&type=json";

#[derive(Debug, Deserialize)]
struct CatResponse {
    file: String,
}

#[derive(Debug, Deserialize)]
struct InsultResponse {
    insult: String,
}

/// Client for the third-party novelty content APIs.
///
/// No retry policy: a failed request surfaces as a [`ContentError`].
#[derive(Clone, Default)]
pub struct ContentClient {
    http: reqwest::Client,
}

impl ContentClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// URL of a random cat picture.
    pub async fn random_cat(&self) -> Result<String, ContentError> {
        let response: CatResponse = self
            .http
            .get(CAT_ENDPOINT)
            .send()
            .await
            .map_err(|source| ContentError::RequestFailed {
                endpoint: CAT_ENDPOINT,
                source,
            })?
            .json()
            .await
            .map_err(|source| ContentError::RequestFailed {
                endpoint: CAT_ENDPOINT,
                source,
            })?;
        Ok(response.file)
    }

    /// A random English insult.
    pub async fn insult(&self) -> Result<String, ContentError> {
        let response: InsultResponse = self
            .http
            .get(INSULT_ENDPOINT)
            .send()
            .await
            .map_err(|source| ContentError::RequestFailed {
                endpoint: INSULT_ENDPOINT,
                source,
            })?
            .json()
            .await
            .map_err(|source| ContentError::RequestFailed {
                endpoint: INSULT_ENDPOINT,
                source,
            })?;
        Ok(response.insult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cat_response_shape() {
        let parsed: CatResponse =
            serde_json::from_str(r#"{"file":"https://example.invalid/cat.jpg"}"#).unwrap();
        assert_eq!(parsed.file, "https://example.invalid/cat.jpg");
    }

    #[test]
    fn test_insult_response_shape() {
        let parsed: InsultResponse =
            serde_json::from_str(r#"{"insult":"you absolute walnut","number":"1"}"#).unwrap();
        assert_eq!(parsed.insult, "you absolute walnut");
    }
}
