use ureq;

use super::{Client, Error, Response};

pub struct Request {
    inner: ureq::Request,
}

impl Request {
    pub(super) fn get(client: &Client, url: &str) -> Self {
        Self::with_method(client, "GET", url)
    }

    pub(super) fn post(client: &Client, url: &str) -> Self {
        Self::with_method(client, "POST", url)
    }

    fn with_method(client: &Client, method: &str, url: &str) -> Self {
        let inner = ureq::request(method, url)
            .timeout(client.timeout)
            .set("User-Agent", &client.user_agent);
        Self { inner }
    }

    pub fn query(mut self, param: &str, value: &str) -> Self {
        self.inner = self.inner.query(param, value);
        self
    }

    pub fn set(mut self, header: &str, value: &str) -> Self {
        self.inner = self.inner.set(header, value);
        self
    }

    pub fn call(self) -> Result<Response, Error> {
        self.inner
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => Error::Status(
                    code,
                    Response {
                        reader: resp.into_reader(),
                    },
                ),
                ureq::Error::Transport(tp) => Error::Transport(tp.to_string().into()),
            })
            .map(|resp| Response {
                reader: resp.into_reader(),
            })
    }
}
