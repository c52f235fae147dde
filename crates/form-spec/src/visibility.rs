use std::collections::BTreeMap;

use crate::spec::field::FieldConfig;
use crate::spec::form::FormConfig;

pub type VisibilityMap = BTreeMap<String, bool>;

/// Visible fields in rendering order, paired with their section index.
///
/// A field is visible when both its section and the field itself are shown.
/// Paragraphs are included; callers that only want data fields filter them.
pub fn visible_fields(config: &FormConfig) -> impl Iterator<Item = (usize, &FieldConfig)> {
    config
        .sections
        .iter()
        .enumerate()
        .filter(|(_, section)| section.show)
        .flat_map(|(idx, section)| {
            section
                .fields
                .iter()
                .filter(|field| field.is_visible())
                .map(move |field| (idx, field))
        })
}

/// Visibility per field name. An aliased name is visible if any declaring field is.
pub fn resolve_visibility(config: &FormConfig) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    for section in &config.sections {
        for field in &section.fields {
            let Some(name) = field.name() else {
                continue;
            };
            let visible = section.show && field.is_visible();
            let entry = map.entry(name.to_string()).or_insert(false);
            *entry = *entry || visible;
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::InputType;
    use crate::spec::form::SectionConfig;

    #[test]
    fn hidden_section_hides_its_fields() {
        let mut hidden = SectionConfig::new(
            "Billing",
            vec![FieldConfig::input("card", InputType::Text)],
        );
        hidden.show = false;
        let config = FormConfig::new(
            "form",
            vec![
                SectionConfig::new(
                    "Contact",
                    vec![
                        FieldConfig::input("name", InputType::Text),
                        FieldConfig::input("nickname", InputType::Text).show(false),
                    ],
                ),
                hidden,
            ],
        );

        let visible: Vec<_> = visible_fields(&config)
            .filter_map(|(_, field)| field.name())
            .collect();
        assert_eq!(visible, vec!["name"]);

        let map = resolve_visibility(&config);
        assert_eq!(map.get("name"), Some(&true));
        assert_eq!(map.get("nickname"), Some(&false));
        assert_eq!(map.get("card"), Some(&false));
    }
}
