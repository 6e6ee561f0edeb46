#[cfg(all(feature = "curl", feature = "ureq"))]
compile_error!("The features `curl` and `ureq` must not be enabled together!");

#[cfg(feature = "curl")]
mod curl_backend;

#[cfg(feature = "ureq")]
mod ureq_backend;

use std::io::{self, Read};
use std::time::Duration;

#[cfg(feature = "curl")]
pub use curl_backend::Request;

#[cfg(feature = "ureq")]
pub use ureq_backend::Request;

/// Settings shared by every outgoing request of an invocation. Each request
/// is bounded by `timeout`, so a silent remote party cannot stall the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    user_agent: Box<str>,
    timeout: Duration,
}

impl Client {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout,
        }
    }

    pub fn get(&self, url: &str) -> Request {
        Request::get(self, url)
    }

    pub fn post(&self, url: &str) -> Request {
        Request::post(self, url)
    }
}

pub struct Response {
    pub(self) reader: Box<dyn Read>,
}

pub enum Error {
    Status(u16, Response),
    Transport(Box<str>),
}

impl Response {
    pub fn into_string(self) -> Result<String, io::Error> {
        let mut vec = Vec::with_capacity(1024);
        let read = self.reader.take(2 * 1024 * 1024).read_to_end(&mut vec)?;
        vec.resize(read, 0);
        String::from_utf8(vec).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn response(body: &'static [u8]) -> Response {
        Response {
            reader: Box::new(Cursor::new(body)),
        }
    }

    #[test]
    fn body_as_string() {
        assert_eq!(response(b"good 5.6.7.8").into_string().unwrap(), "good 5.6.7.8");

        let err = response(&[0xff, 0xfe, 0x00]).into_string().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn client_settings() {
        let client = Client::new("dynwatch/test", Duration::from_secs(3));
        assert_eq!(&*client.user_agent, "dynwatch/test");
        assert_eq!(client.timeout, Duration::from_secs(3));
    }
}
