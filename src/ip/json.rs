use serde_derive::Deserialize;

use crate::http::Client;

use super::{fetch, IpLookup, LookupError};

/// An IP echo service answering with `{"ip": "<address>"}`, such as ipify.
pub struct JsonEcho {
    client: Client,
    url: Box<str>,
}

#[derive(Deserialize)]
struct EchoBody {
    #[serde(default)]
    ip: Option<String>,
}

impl JsonEcho {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl IpLookup for JsonEcho {
    fn lookup(&self) -> Result<Option<Box<str>>, LookupError> {
        let text = fetch(&self.client, &self.url)?
            .into_string()
            .map_err(|e| LookupError::Malformed(self.url.clone(), e.to_string().into()))?;

        extract(&text).map_err(|e| LookupError::Malformed(self.url.clone(), e.to_string().into()))
    }
}

pub(super) fn extract(text: &str) -> Result<Option<Box<str>>, serde_json::Error> {
    let body = serde_json::from_str::<EchoBody>(text)?;
    Ok(body.ip.map(String::into_boxed_str))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::http::testing::serve_once;

    use super::*;

    #[test]
    fn address_field() {
        assert_eq!(extract(r#"{"ip":"5.6.7.8"}"#).unwrap(), Some("5.6.7.8".into()));
        assert_eq!(extract(r#"{"ip":""}"#).unwrap(), Some("".into()));
        assert_eq!(extract(r#"{"ip":null}"#).unwrap(), None);
        assert_eq!(extract(r#"{"origin":"5.6.7.8"}"#).unwrap(), None);
    }

    #[test]
    fn not_json() {
        assert!(extract("5.6.7.8").is_err());
        assert!(extract("<html><body>oops</body></html>").is_err());
    }

    #[test]
    fn lookup_over_http() {
        let (base, server) = serve_once("200 OK", r#"{"ip":"198.51.100.23"}"#);
        let client = Client::new("dynwatch/test", Duration::from_secs(5));
        let echo = JsonEcho::new(client, &format!("{}/?format=json", base));

        assert_eq!(echo.lookup().unwrap(), Some("198.51.100.23".into()));

        let received = server.join().unwrap();
        assert_eq!(received.request_line, "GET /?format=json HTTP/1.1");
        assert_eq!(received.header("User-Agent"), Some("dynwatch/test"));
    }

    #[test]
    fn html_from_json_source() {
        let (base, server) = serve_once("200 OK", "<html><body>oops</body></html>");
        let echo = JsonEcho::new(Client::new("dynwatch/test", Duration::from_secs(5)), &base);

        assert!(matches!(echo.lookup(), Err(LookupError::Malformed(..))));
        server.join().unwrap();
    }
}
