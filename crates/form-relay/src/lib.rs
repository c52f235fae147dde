//! Delivery side of the landing form: enrichment, sinks, and the fan-out that
//! decides whether a submission succeeded.

pub mod enrich;
pub mod relay;
pub mod sink;
pub mod submission;

pub use enrich::{
    AddressLookup, Clock, Enricher, FixedClock, HttpAddressLookup, LookupError, SystemClock,
};
pub use relay::{Relay, SinkOutcome, SinkRole, SubmissionReport, settle};
pub use sink::{Encoding, HttpSink, ResponseMode, Sink, SinkAck, SinkError};
pub use submission::{IP_ADDRESS_KEY, Submission, TIMESTAMP_KEY};
