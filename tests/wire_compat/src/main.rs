fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tribute_protocol::messages::{
        AddBotResponse, CheckChannelResponse, CreateUserResponse, ErrorResponse,
        PublishSubscriptionRequest, PublishSubscriptionResponse, SetUpPayoutsRequest,
        UploadVerifiedPassportRequest,
    };
    use tribute_protocol::{Channel, DashboardSnapshot};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON values so that integer-valued floats compare equal.
    ///
    /// The backend sends `0` for an amount Rust serializes as `0.0`.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => serde_json::json!(f),
                None => v.clone(),
            },
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect(),
            ),
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture, re-serializes it, and compares the JSON values
    /// (order-independent, float-normalized).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  backend: {fixture}\n  client:  {reserialized}"
        );
        parsed
    }

    // --- Responses ---

    #[test]
    fn fixture_dashboard() {
        let snap = roundtrip_test::<DashboardSnapshot>("dashboard.json");
        assert_eq!(snap.channels.len(), 2);
        assert_eq!(snap.subscriptions[0].id, "sub-42");
        assert_eq!(snap.payment_history[1].amount, None);
    }

    #[test]
    fn fixture_create_user_response() {
        let resp = roundtrip_test::<CreateUserResponse>("create_user_response.json");
        assert!(resp.created);
        assert!(resp.user.is_onboarded);
    }

    #[test]
    fn fixture_channel_list() {
        let channels = roundtrip_test::<Vec<Channel>>("channel_list.json");
        assert!(channels[0].verified);
        assert!(channels[1].handle.is_empty());
    }

    #[test]
    fn fixture_check_channel_response() {
        roundtrip_test::<CheckChannelResponse>("check_channel_response.json");
    }

    #[test]
    fn fixture_add_bot_response() {
        roundtrip_test::<AddBotResponse>("add_bot_response.json");
    }

    #[test]
    fn fixture_publish_subscription_response() {
        roundtrip_test::<PublishSubscriptionResponse>("publish_subscription_response.json");
    }

    #[test]
    fn fixture_error_response() {
        let resp = roundtrip_test::<ErrorResponse>("error_response.json");
        assert_eq!(resp.text(), Some("Card verification failed"));
    }

    // --- Requests ---

    #[test]
    fn fixture_publish_subscription_request() {
        roundtrip_test::<PublishSubscriptionRequest>("publish_subscription_request.json");
    }

    #[test]
    fn fixture_set_up_payouts_request() {
        roundtrip_test::<SetUpPayoutsRequest>("set_up_payouts_request.json");
    }

    #[test]
    fn fixture_upload_verified_passport_request() {
        roundtrip_test::<UploadVerifiedPassportRequest>("upload_verified_passport_request.json");
    }

    // --- Lenient parsing of older or sparser payloads ---

    #[test]
    fn numeric_channel_ids_become_strings() {
        let json = r#"[{"id": -1001987654321, "channel_username": "@daily_digest"}]"#;
        let channels: Vec<Channel> = serde_json::from_str(json).unwrap();
        assert_eq!(channels[0].id, "-1001987654321");
        assert!(!channels[0].verified, "missing is_verified should default to false");
    }

    #[test]
    fn sparse_dashboard_defaults() {
        let snap: DashboardSnapshot = serde_json::from_str(r#"{"earn": 0}"#).unwrap();
        assert_eq!(snap, DashboardSnapshot::default());
    }

    #[test]
    fn error_body_with_message_only() {
        let resp: ErrorResponse =
            serde_json::from_str(r#"{"message": "Identity not verified"}"#).unwrap();
        assert_eq!(resp.text(), Some("Identity not verified"));
    }

    #[test]
    fn payouts_request_without_optional_fields() {
        let json = r#"{"card-number": "4242424242424242"}"#;
        let req: SetUpPayoutsRequest = serde_json::from_str(json).unwrap();
        assert!(req.card_date.is_none());
        assert!(req.access_token.is_none());
        assert_eq!(serde_json::to_string(&req).unwrap(), json.replace(' ', ""));
    }
}
