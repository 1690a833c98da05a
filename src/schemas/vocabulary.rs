use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VocabularyResponse {
	pub name:   String,
	pub values: Vec<String>,
}
