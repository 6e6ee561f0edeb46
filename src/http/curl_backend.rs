use std::io::Cursor;

use curl::easy::{Easy, List};

use super::{Client, Error, Response};

pub struct Request {
    curl: Easy,
    header_list: List,
    url: Box<str>,
    queries: String,
    setup_error: Option<curl::Error>,
}

impl Request {
    pub(super) fn get(client: &Client, url: &str) -> Self {
        let mut request = Self::new(client, url);
        let result = request.curl.get(true);
        request.record(result);
        request
    }

    pub(super) fn post(client: &Client, url: &str) -> Self {
        let mut request = Self::new(client, url);
        // The dyndns2 protocol carries everything in the query string.
        let result = request
            .curl
            .post(true)
            .and_then(|_| request.curl.post_field_size(0));
        request.record(result);
        request
    }

    fn new(client: &Client, url: &str) -> Self {
        let mut request = Self {
            curl: Easy::new(),
            header_list: List::new(),
            url: url.into(),
            queries: String::new(),
            setup_error: None,
        };

        let result = request
            .curl
            .useragent(&client.user_agent)
            .and_then(|_| request.curl.timeout(client.timeout));
        request.record(result);
        request
    }

    fn record(&mut self, result: Result<(), curl::Error>) {
        if let Err(e) = result {
            self.setup_error.get_or_insert(e);
        }
    }

    pub fn query(mut self, param: &str, value: &str) -> Self {
        let param = self.curl.url_encode(param.as_bytes());
        let value = self.curl.url_encode(value.as_bytes());

        if self.queries.is_empty() && !self.url.contains('?') {
            self.queries = self.queries + "?" + &param + "=" + &value;
        } else {
            self.queries = self.queries + "&" + &param + "=" + &value;
        }

        self
    }

    pub fn set(mut self, header: &str, value: &str) -> Self {
        let header = String::from(header) + ": " + value;
        let result = self.header_list.append(&header);
        self.record(result);
        self
    }

    pub fn call(mut self) -> Result<Response, Error> {
        if let Some(err) = self.setup_error {
            return Err(Error::Transport(err.description().into()));
        }

        let url = String::from(self.url) + &self.queries;
        self.curl
            .url(&url)
            .and_then(|_| self.curl.http_headers(self.header_list))
            .map_err(|e| Error::Transport(e.description().into()))?;

        let mut response = Vec::with_capacity(8192);
        let mut transfer = self.curl.transfer();

        transfer
            .write_function(|src| {
                response.extend(src.iter().copied());
                Ok(src.len())
            })
            .map_err(|e| Error::Transport(e.description().into()))?;

        if let Err(err) = transfer.perform() {
            return Err(Error::Transport(err.description().into()));
        };

        drop(transfer);

        let response = Response {
            reader: Box::new(Cursor::new(response)),
        };

        let response_code = self
            .curl
            .response_code()
            .map_err(|e| Error::Transport(e.description().into()))?;
        if response_code >= 400 {
            return Err(Error::Status(response_code as u16, response));
        };

        Ok(response)
    }
}
