use serde::Serialize;

/// Request body for `POST sql/ddl` and `POST sql/dml`
///
/// Schema creation has no resource id; the field is omitted entirely in
/// that case rather than sent as null.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub sql_text: String,
}

/// Request body for `POST sql/dql`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DqlRequest {
    pub resource_id: String,
    pub sql_text: String,
    /// Row limit. Omitted to fetch everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_request_omits_resource_id() {
        let request = SqlRequest {
            resource_id: None,
            sql_text: "CREATE SCHEMA NS1".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"sqlText": "CREATE SCHEMA NS1"}));
    }

    #[test]
    fn test_dql_request_omits_absent_row_count() {
        let request = DqlRequest {
            resource_id: "NS1.TAB1".to_string(),
            sql_text: "SELECT * FROM ns1.tab1".to_string(),
            row_count: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "resourceId": "NS1.TAB1",
                "sqlText": "SELECT * FROM ns1.tab1",
            })
        );
    }

    #[test]
    fn test_dql_request_carries_row_count_when_set() {
        let request = DqlRequest {
            resource_id: "NS1.TAB1".to_string(),
            sql_text: "SELECT * FROM ns1.tab1".to_string(),
            row_count: Some(25),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["rowCount"], 25);
    }
}
