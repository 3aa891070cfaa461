use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: i32,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::IdInput;

	#[test]
	fn test_id_input_accepts_any_integer() {
		let input: IdInput = serde_json::from_value(serde_json::json!({ "id": -4 })).unwrap();

		assert_eq!(input.id, -4);
		assert!(input.validate().is_ok());
	}
}
