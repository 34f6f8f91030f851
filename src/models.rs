use serde::{Deserialize, Serialize};

/// The questionnaire a caller submits to have their will drawn up.
/// Every field defaults to the empty string so validation can report
/// the full set of missing fields instead of failing on the first one.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct WillRequest {
    pub full_name: String,
    pub website: String,
    pub playlist: String,
    pub work_app: String,
    pub best_friend: String,
    pub social_platform: String,
    pub social_handle: String,
    pub trend: String,
    pub signature: String,
}

impl WillRequest {
    /// Names (wire spelling) of every empty field, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields: [(&'static str, &str); 9] = [
            ("fullName", &self.full_name),
            ("website", &self.website),
            ("playlist", &self.playlist),
            ("workApp", &self.work_app),
            ("bestFriend", &self.best_friend),
            ("socialPlatform", &self.social_platform),
            ("socialHandle", &self.social_handle),
            ("trend", &self.trend),
            ("signature", &self.signature),
        ];
        fields
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WillResponse {
    pub will: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete_request() -> WillRequest {
        serde_json::from_value(serde_json::json!({
            "fullName": "Ada Lovelace",
            "website": "news.ycombinator.com",
            "playlist": "Lo-fi Beats to Debug To",
            "workApp": "Jira",
            "bestFriend": "Charles",
            "socialPlatform": "Mastodon",
            "socialHandle": "@ada",
            "trend": "AI influencers",
            "signature": "Sent from my abacus"
        }))
        .unwrap()
    }

    #[test]
    fn complete_request_has_no_missing_fields() {
        assert_eq!(complete_request().missing_fields(), Vec::<&str>::new());
    }

    #[test]
    fn empty_body_reports_all_nine_fields_in_order() {
        let req: WillRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            req.missing_fields(),
            vec![
                "fullName",
                "website",
                "playlist",
                "workApp",
                "bestFriend",
                "socialPlatform",
                "socialHandle",
                "trend",
                "signature"
            ]
        );
    }

    #[test]
    fn missing_subset_is_reported_with_wire_names() {
        let mut req = complete_request();
        req.work_app.clear();
        req.social_handle.clear();
        assert_eq!(req.missing_fields(), vec!["workApp", "socialHandle"]);
    }

    #[test]
    fn camel_case_wire_names_round_trip() {
        let json = serde_json::to_value(complete_request()).unwrap();
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["bestFriend"], "Charles");
        assert_eq!(json["socialPlatform"], "Mastodon");
    }
}
