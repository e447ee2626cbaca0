use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::{OracleError, RateOracle};

#[derive(Debug, Deserialize)]
struct RateResponse {
    rate: Value,
}

fn parse_rate(raw: &Value) -> Result<BigDecimal, OracleError> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(OracleError::BadResponse(format!(
                "rate must be a number, got {other}"
            )))
        }
    };
    BigDecimal::from_str(&text).map_err(|e| OracleError::BadResponse(format!("{text}: {e}")))
}

/// Remote tax-rate lookup: `GET {base_url}/rates?zip=<zip>` answering
/// `{"rate": 0.0825}`.
pub struct HttpRateOracle {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateOracle {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateOracle for HttpRateOracle {
    async fn rate_for(&self, zip: &str) -> Result<BigDecimal, OracleError> {
        let resp = self
            .client
            .get(format!("{}/rates", self.base_url))
            .query(&[("zip", zip)])
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(OracleError::BadResponse(format!("status {}", resp.status())));
        }

        let body: RateResponse = resp
            .json()
            .await
            .map_err(|e| OracleError::BadResponse(e.to_string()))?;
        parse_rate(&body.rate)
    }
}

/// Answers every lookup with the same rate. Used when no remote oracle is
/// configured.
pub struct FlatRateOracle {
    rate: BigDecimal,
}

impl FlatRateOracle {
    pub fn new(rate: BigDecimal) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl RateOracle for FlatRateOracle {
    async fn rate_for(&self, _zip: &str) -> Result<BigDecimal, OracleError> {
        Ok(self.rate.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numeric_and_string_rates() {
        assert_eq!(
            parse_rate(&json!(0.0825)).unwrap(),
            BigDecimal::from_str("0.0825").unwrap()
        );
        assert_eq!(
            parse_rate(&json!(" 0.07 ")).unwrap(),
            BigDecimal::from_str("0.07").unwrap()
        );
    }

    #[test]
    fn rejects_non_numeric_rates() {
        assert!(matches!(
            parse_rate(&json!("abc")),
            Err(OracleError::BadResponse(_))
        ));
        assert!(matches!(
            parse_rate(&json!(null)),
            Err(OracleError::BadResponse(_))
        ));
    }

    #[tokio::test]
    async fn flat_oracle_ignores_zip() {
        let oracle = FlatRateOracle::new(BigDecimal::from_str("0.05").unwrap());
        assert_eq!(
            oracle.rate_for("99999").await.unwrap(),
            BigDecimal::from_str("0.05").unwrap()
        );
    }

    #[tokio::test]
    async fn unreachable_oracle_is_a_transport_error() {
        let oracle = HttpRateOracle::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            oracle.rate_for("10001").await,
            Err(OracleError::Transport(_))
        ));
    }

    #[derive(Deserialize)]
    struct RateQuery {
        zip: String,
    }

    async fn rates(query: actix_web::web::Query<RateQuery>) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match query.zip.as_str() {
            "10001" => HttpResponse::Ok().json(json!({ "rate": 0.0825 })),
            "94105" => HttpResponse::Ok().json(json!({ "rate": "0.0725" })),
            "60601" => HttpResponse::Ok().json(json!({ "rate": "n/a" })),
            _ => HttpResponse::ServiceUnavailable().finish(),
        }
    }

    /// Serves `GET /rates?zip=` on a random local port.
    fn spawn_rate_server() -> String {
        use actix_web::{web, App, HttpServer};

        let server = HttpServer::new(|| App::new().route("/rates", web::get().to(rates)))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .expect("bind rate server");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}/")
    }

    #[actix_web::test]
    async fn http_oracle_reads_rate_for_zip() {
        let oracle = HttpRateOracle::new(&spawn_rate_server(), Duration::from_secs(2)).unwrap();

        assert_eq!(
            oracle.rate_for("10001").await.unwrap(),
            BigDecimal::from_str("0.0825").unwrap()
        );
        assert_eq!(
            oracle.rate_for("94105").await.unwrap(),
            BigDecimal::from_str("0.0725").unwrap()
        );
    }

    #[actix_web::test]
    async fn http_oracle_rejects_error_status_and_bad_body() {
        let oracle = HttpRateOracle::new(&spawn_rate_server(), Duration::from_secs(2)).unwrap();

        match oracle.rate_for("00000").await {
            Err(OracleError::BadResponse(msg)) => assert!(msg.contains("503"), "{msg}"),
            other => panic!("expected BadResponse, got {other:?}"),
        }
        assert!(matches!(
            oracle.rate_for("60601").await,
            Err(OracleError::BadResponse(_))
        ));
    }
}
