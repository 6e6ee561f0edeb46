use std::net::IpAddr;

use log::{debug, info};

use crate::http::{Client, Error};
use crate::util::basic_auth;

use super::{DdnsService, DdnsUpdateError, UpdateOutcome};

/// Everything needed to talk to a provider speaking the dyndns2 protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Host name of the provider, e.g. `domains.google.com`. A full
    /// `scheme://host[:port]` base is used as given.
    pub server: Box<str>,
    pub username: Box<str>,
    pub password: Box<str>,
    pub hostname: Box<str>,
}

pub struct Service {
    server: Box<str>,
    endpoint: Box<str>,
    hostname: Box<str>,
    auth: Box<str>,
    client: Client,
}

impl Service {
    pub fn from_config(client: Client, config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            endpoint: endpoint(&config.server).into(),
            hostname: config.hostname.clone(),
            auth: basic_auth(&config.username, &config.password),
            client,
        }
    }
}

fn endpoint(server: &str) -> String {
    if server.contains("://") {
        format!("{}/nic/update", server.trim_end_matches('/'))
    } else {
        format!("https://{}/nic/update", server)
    }
}

impl DdnsService for Service {
    fn update_record(&mut self, ip: IpAddr) -> Result<UpdateOutcome, DdnsUpdateError> {
        let request = self
            .client
            .post(&self.endpoint)
            .set("Authorization", &self.auth)
            .query("hostname", &self.hostname)
            .query("myip", &ip.to_string());

        debug!("POST {} hostname={} myip={}", self.endpoint, self.hostname, ip);

        match request.call() {
            Ok(resp) | Err(Error::Status(_, resp)) => {
                let resp = resp
                    .into_string()
                    .map_err(|e| DdnsUpdateError::Unreadable(self.server.clone(), e.to_string().into()))?;

                info!("{} response: {}", self.server, resp.trim());

                Ok(parse_response(&resp, ip))
            }

            Err(Error::Transport(t)) => Err(DdnsUpdateError::TransportError(t)),
        }
    }
}

/// Interprets the plain-text answer of a dyndns2 provider to a request for
/// `requested`.
pub fn parse_response(resp: &str, requested: IpAddr) -> UpdateOutcome {
    let resp = resp.trim();

    if let Some(rest) = resp.strip_prefix("good") {
        // Some providers don't echo the address back. In that case assume the
        // one we asked for.
        let echoed = rest
            .split(',')
            .next()
            .and_then(|r| r.trim().parse::<IpAddr>().ok());

        UpdateOutcome::Updated(echoed.unwrap_or(requested))
    } else if resp.starts_with("nochg") {
        UpdateOutcome::Unchanged
    } else {
        UpdateOutcome::Failed(describe_failure(resp))
    }
}

fn describe_failure(resp: &str) -> Box<str> {
    let known = [
        ("badauth", "Bad authentication details were provided"),
        ("!donator", "Only credited users are allowed"),
        ("notfqdn", "Domain must be fully-qualified"),
        ("nohost", "Hostname does not exist in the user account"),
        ("numhost", "Too many hosts are specified"),
        ("abuse", "Domain is blocked because of abuse"),
        ("badagent", "Bad user agent was provided"),
        ("conflict", "The hostname has conflicting records"),
        ("911", "The provider reported a problem on its end"),
        ("dnserr", "The provider reported a problem on its end"),
    ];

    match known.iter().find(|(token, _)| resp.starts_with(token)) {
        Some((token, meaning)) => format!("{} ({})", meaning, token).into(),
        None if resp.is_empty() => "The provider returned an empty response".into(),
        None => format!("Unrecognized response \"{}\"", resp).into(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    use crate::http::testing::serve_once;

    use super::*;

    const ASKED: IpAddr = IpAddr::V4(Ipv4Addr::new(5, 6, 7, 8));

    #[test]
    fn good() {
        assert_eq!(parse_response("good 5.6.7.8", ASKED), UpdateOutcome::Updated(ASKED));
        assert_eq!(parse_response("good 5.6.7.8\n", ASKED), UpdateOutcome::Updated(ASKED));
        assert_eq!(parse_response("good", ASKED), UpdateOutcome::Updated(ASKED));

        let v6 = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));
        assert_eq!(parse_response("good 2001:db8::1", ASKED), UpdateOutcome::Updated(v6));
    }

    #[test]
    fn nochg() {
        assert_eq!(parse_response("nochg 5.6.7.8", ASKED), UpdateOutcome::Unchanged);
        assert_eq!(parse_response("nochg", ASKED), UpdateOutcome::Unchanged);
    }

    #[test]
    fn failures() {
        assert_eq!(
            parse_response("badauth", ASKED),
            UpdateOutcome::Failed("Bad authentication details were provided (badauth)".into())
        );
        assert_eq!(
            parse_response("911", ASKED),
            UpdateOutcome::Failed("The provider reported a problem on its end (911)".into())
        );
        assert_eq!(
            parse_response("<html>503</html>", ASKED),
            UpdateOutcome::Failed("Unrecognized response \"<html>503</html>\"".into())
        );
        assert_eq!(
            parse_response("  \n", ASKED),
            UpdateOutcome::Failed("The provider returned an empty response".into())
        );
    }

    #[test]
    fn endpoint_and_auth() {
        let config = Config {
            server: "domains.example.net".into(),
            username: "user".into(),
            password: "pass".into(),
            hostname: "home.example.net".into(),
        };
        let service = Service::from_config(Client::new("test", Duration::from_secs(1)), &config);

        assert_eq!(&*service.endpoint, "https://domains.example.net/nic/update");
        assert_eq!(&*service.auth, "Basic dXNlcjpwYXNz");

        assert_eq!(endpoint("http://127.0.0.1:8080/"), "http://127.0.0.1:8080/nic/update");
    }

    fn local_service(base: &str) -> Service {
        let config = Config {
            server: base.into(),
            username: "user".into(),
            password: "pass".into(),
            hostname: "home.example.net".into(),
        };
        Service::from_config(Client::new("dynwatch/test", Duration::from_secs(5)), &config)
    }

    #[test]
    fn update_request_on_the_wire() {
        let (base, server) = serve_once("200 OK", "good 5.6.7.8");
        let outcome = local_service(&base).update_record(ASKED).unwrap();
        let received = server.join().unwrap();

        assert_eq!(outcome, UpdateOutcome::Updated(ASKED));
        assert_eq!(
            received.request_line,
            "POST /nic/update?hostname=home.example.net&myip=5.6.7.8 HTTP/1.1"
        );
        assert_eq!(received.header("authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(received.header("user-agent"), Some("dynwatch/test"));
    }

    #[test]
    fn unauthorized_status_is_a_failed_update() {
        let (base, server) = serve_once("401 Unauthorized", "badauth");
        let outcome = local_service(&base).update_record(ASKED).unwrap();
        server.join().unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::Failed("Bad authentication details were provided (badauth)".into())
        );
    }

    #[test]
    fn unreachable_provider_is_fatal() {
        // Bind and drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let result = local_service(&format!("http://127.0.0.1:{}", port)).update_record(ASKED);

        assert!(matches!(result, Err(DdnsUpdateError::TransportError(_))));
    }
}
