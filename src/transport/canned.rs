//! In-memory proxy that answers from canned responses.
//!
//! Discover responses are keyed by request type plus a subset of restriction
//! values; the most specific matching entry wins. Requests with no matching
//! entry are answered with a SOAP fault, so a missing fixture surfaces as an
//! error instead of an empty rowset.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::proxy::{ServerInfo, XmlaProxy};
use crate::error::XmlaResult;
use crate::xmla::dom::{self, Element};
use crate::xmla::request::MetadataRequest;
use crate::xmla::row::find_child;
use crate::xmla::SoapAction;

/// A request as seen by the canned proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub action: SoapAction,
    pub request_type: Option<String>,
    pub restrictions: Vec<(String, String)>,
    pub statement: Option<String>,
}

impl RecordedRequest {
    fn from_envelope(action: SoapAction, body: &[u8]) -> Self {
        let mut recorded = Self {
            action,
            request_type: None,
            restrictions: Vec::new(),
            statement: None,
        };

        let Ok(envelope) = dom::parse(body) else {
            return recorded;
        };
        let Some(method) = find_child(&envelope, None, "Body")
            .and_then(|body| find_child(body, None, action.element()))
        else {
            return recorded;
        };

        recorded.request_type = find_child(method, None, "RequestType").map(Element::text);
        recorded.statement = find_child(method, None, "Command")
            .and_then(|command| find_child(command, None, "Statement"))
            .map(Element::text);
        if let Some(list) = find_child(method, None, "Restrictions")
            .and_then(|r| find_child(r, None, "RestrictionList"))
        {
            recorded.restrictions = list
                .elements()
                .map(|e| (e.local_name().to_string(), e.text()))
                .collect();
        }
        recorded
    }

    fn restriction(&self, key: &str) -> Option<&str> {
        self.restrictions
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct Canned {
    action: SoapAction,
    request_type: Option<String>,
    restrictions: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Canned {
    fn matches(&self, request: &RecordedRequest) -> bool {
        self.action == request.action
            && (self.request_type.is_none() || self.request_type == request.request_type)
            && self
                .restrictions
                .iter()
                .all(|(k, v)| request.restriction(k) == Some(v.as_str()))
    }
}

/// Test double for [`XmlaProxy`].
#[derive(Default)]
pub struct CannedProxy {
    responses: Mutex<Vec<Canned>>,
    recorded: Mutex<Vec<RecordedRequest>>,
    count: AtomicUsize,
    latency: Option<Duration>,
}

impl CannedProxy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, to widen race windows in concurrency tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer `request` with `body` when every pair in `restrictions` is present.
    pub fn on_discover(
        self,
        request: MetadataRequest,
        restrictions: &[(&str, &str)],
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.responses.lock().push(Canned {
            action: SoapAction::Discover,
            request_type: Some(request.name().to_string()),
            restrictions: restrictions
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.into(),
        });
        self
    }

    /// Answer every Execute request with `body`.
    pub fn on_execute(self, body: impl Into<Vec<u8>>) -> Self {
        self.responses.lock().push(Canned {
            action: SoapAction::Execute,
            request_type: None,
            restrictions: Vec::new(),
            body: body.into(),
        });
        self
    }

    /// Total number of requests received.
    pub fn request_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Number of Discover requests of one type.
    pub fn requests_for(&self, request: MetadataRequest) -> usize {
        self.recorded
            .lock()
            .iter()
            .filter(|r| r.request_type.as_deref() == Some(request.name()))
            .count()
    }

    /// Every request received, in arrival order.
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().clone()
    }

    fn answer(&self, request: &RecordedRequest) -> Vec<u8> {
        let responses = self.responses.lock();
        responses
            .iter()
            .filter(|canned| canned.matches(request))
            .max_by_key(|canned| canned.restrictions.len())
            .map(|canned| canned.body.clone())
            .unwrap_or_else(|| {
                let what = request
                    .request_type
                    .as_deref()
                    .unwrap_or(request.action.element());
                fault_response("SOAP-ENV:Client", &format!("no canned response for {what}"))
                    .into_bytes()
            })
    }
}

#[async_trait]
impl XmlaProxy for CannedProxy {
    async fn get(
        &self,
        _server: &ServerInfo,
        action: SoapAction,
        request: &[u8],
    ) -> XmlaResult<Vec<u8>> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let recorded = RecordedRequest::from_envelope(action, request);
        let body = self.answer(&recorded);
        self.recorded.lock().push(recorded);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(body)
    }
}

fn escape(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// A DiscoverResponse envelope with one `row` per entry.
pub fn rowset_response(rows: &[&[(&str, &str)]]) -> String {
    let mut out = String::from(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body><cxmla:DiscoverResponse xmlns:cxmla="urn:schemas-microsoft-com:xml-analysis"><cxmla:return><root xmlns="urn:schemas-microsoft-com:xml-analysis:rowset">"#,
    );
    for row in rows {
        out.push_str("<row>");
        for (name, value) in row.iter() {
            out.push_str(&format!("<{name}>{}</{name}>", escape(value)));
        }
        out.push_str("</row>");
    }
    out.push_str("</root></cxmla:return></cxmla:DiscoverResponse></SOAP-ENV:Body></SOAP-ENV:Envelope>");
    out
}

/// An ExecuteResponse envelope wrapping `dataset`, the inner XML of an mddataset root.
pub fn dataset_response(dataset: &str) -> String {
    format!(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body><cxmla:ExecuteResponse xmlns:cxmla="urn:schemas-microsoft-com:xml-analysis"><cxmla:return><root xmlns="urn:schemas-microsoft-com:xml-analysis:mddataset">{dataset}</root></cxmla:return></cxmla:ExecuteResponse></SOAP-ENV:Body></SOAP-ENV:Envelope>"#
    )
}

/// A SOAP fault envelope.
pub fn fault_response(code: &str, string: &str) -> String {
    format!(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body><SOAP-ENV:Fault><faultcode>{}</faultcode><faultstring>{}</faultstring></SOAP-ENV:Fault></SOAP-ENV:Body></SOAP-ENV:Envelope>"#,
        escape(code),
        escape(string)
    )
}
