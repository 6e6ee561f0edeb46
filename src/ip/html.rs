use scraper::{Html, Selector};

use crate::http::Client;

use super::{fetch, IpLookup, LookupError};

/// An IP echo service rendering the address as prose in an HTML page, e.g.
/// checkip.dyndns.org answering `<body>Current IP Address: 1.2.3.4</body>`.
pub struct HtmlEcho {
    client: Client,
    url: Box<str>,
}

impl HtmlEcho {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl IpLookup for HtmlEcho {
    fn lookup(&self) -> Result<Option<Box<str>>, LookupError> {
        let page = fetch(&self.client, &self.url)?
            .into_string()
            .map_err(|e| LookupError::Malformed(self.url.clone(), e.to_string().into()))?;

        Ok(extract(&page))
    }
}

/// The text following the first `": "` in the page body, up to the next
/// whitespace.
pub(super) fn extract(page: &str) -> Option<Box<str>> {
    let text = body_text(page)?;
    let (_, rest) = text.split_once(": ")?;
    rest.split_whitespace().next().map(Box::from)
}

fn body_text(page: &str) -> Option<String> {
    let document = Html::parse_document(page);
    let body = Selector::parse("body").ok()?;

    document
        .select(&body)
        .next()
        .map(|el| el.text().collect::<String>())
}
