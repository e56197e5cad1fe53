//! XMPP Extension Protocols (XEPs) Implementation
//!
//! Small, independent encoders/decoders for the stanza extensions the
//! chat and presence handlers understand. Each module owns its namespace
//! constant and the build/parse functions for its elements.
//!
//! ## Implemented XEPs
//!
//! - **XEP-0004**: Data Forms - form building and parsing with
//!   `FORM_TYPE` hygiene and single/multi value handling.
//! - **XEP-0071**: XHTML-IM - rich message bodies alongside plain text.
//! - **XEP-0085**: Chat State Notifications - typing/paused/gone states.
//! - **XEP-0115**: Entity Capabilities - capability triples in presence.
//! - **XEP-0172**: User Nickname - suggested names on subscription
//!   requests.
//! - **XEP-0184**: Message Delivery Receipts - receipt requests and
//!   acknowledgements.
//! - **XEP-0203**: Delayed Delivery - offline-storage timestamps.
//! - **XEP-0308**: Last Message Correction - replacing a prior message.
//! - **XEP-0313**: Message Archive Management (legacy tags) - archive
//!   references attached to messages.

pub mod xep0004;
pub mod xep0071;
pub mod xep0085;
pub mod xep0115;
pub mod xep0172;
pub mod xep0184;
pub mod xep0203;
pub mod xep0308;
pub mod xep0313;

pub use xep0004::{
    add_form, add_form_of_type, get_values, parse_fields, DataForm, FieldOption, FieldValue,
    FormField, FORM_TYPE, NS_DATA_FORMS,
};

pub use xep0071::{parse_content, wrap_body, xhtml_body, NS_XHTML, NS_XHTML_IM};

pub use xep0085::{state_of, NS_CHAT_STATES};

pub use xep0115::{caps_of, NS_CAPS};

pub use xep0172::{nick_of, NS_NICK};

pub use xep0184::{
    has_receipt_child, received, received_id, request, requests_receipt, NS_RECEIPTS,
};

pub use xep0203::{delay_of, NS_DELAY};

pub use xep0308::{replace, replace_id, NS_CORRECTION};

pub use xep0313::{archived_refs, NS_ARCHIVE};
