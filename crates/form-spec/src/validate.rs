use crate::dispatch::{CheckMode, check_field};
use crate::spec::form::FormConfig;
use crate::value::{ErrorMap, FormData};
use crate::visibility::visible_fields;

/// Validates every visible data field and returns the resulting error map.
///
/// Hidden sections, hidden fields and paragraphs are skipped entirely. The
/// result does not depend on which fields were blurred before. When two
/// visible fields share a name, the first failing one in declaration order
/// owns the message.
pub fn validate(data: &FormData, config: &FormConfig) -> ErrorMap {
    let mut errors = ErrorMap::new();

    for (_, field) in visible_fields(config) {
        let Some(name) = field.name() else {
            continue;
        };
        if let Some(message) = check_field(field, data.get(name), CheckMode::Submit) {
            errors.set_if_absent(name, message);
        }
    }

    errors
}
