use phrasebook::metadata::locale_name_from_path;
use phrasebook::{Args, Client, interpolate, is_valid_locale_name};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
enum Scalar {
    Text(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

impl Scalar {
    fn to_toml(&self) -> toml::Value {
        match self {
            Scalar::Text(value) => toml::Value::String(value.clone()),
            Scalar::Int(value) => toml::Value::Integer(*value),
            Scalar::Bool(value) => toml::Value::Boolean(*value),
            Scalar::Float(value) => toml::Value::Float(*value),
        }
    }

    fn expected_phrase(&self) -> String {
        match self {
            Scalar::Text(value) => value.clone(),
            Scalar::Int(value) => value.to_string(),
            Scalar::Bool(value) => value.to_string(),
            Scalar::Float(value) => format!("{:.2}", value),
        }
    }
}

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("valid key regex")
}

fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        proptest::string::string_regex("[A-Za-z0-9 _\\-\\.,!\\?]{1,30}")
            .expect("valid value regex")
            .prop_map(Scalar::Text),
        any::<i64>().prop_map(Scalar::Int),
        any::<bool>().prop_map(Scalar::Bool),
        (-1.0e6f64..1.0e6).prop_map(Scalar::Float),
    ]
}

fn document_strategy() -> impl Strategy<Value = BTreeMap<String, BTreeMap<String, Scalar>>> {
    prop::collection::btree_map(
        key_strategy(),
        prop::collection::btree_map(key_strategy(), scalar_strategy(), 1..6),
        1..4,
    )
}

fn render_document(locale: &str, sections: &BTreeMap<String, BTreeMap<String, Scalar>>) -> String {
    let mut root = toml::Table::new();
    let mut metadata = toml::Table::new();
    metadata.insert("locale".to_string(), toml::Value::String(locale.to_string()));
    root.insert("__metadata__".to_string(), toml::Value::Table(metadata));

    for (section, values) in sections {
        let table = values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_toml()))
            .collect::<toml::Table>();
        root.insert(section.clone(), toml::Value::Table(table));
    }

    toml::to_string(&root).expect("serialize toml")
}

fn expected_is_valid(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_lowercase()
        && bytes[2] == b'_'
        && bytes[3].is_ascii_uppercase()
        && bytes[4].is_ascii_uppercase()
}

proptest! {
    #[test]
    fn locale_name_validity_matches_pattern(name in "[a-zA-Z_\\-]{3,7}") {
        prop_assert_eq!(is_valid_locale_name(&name), expected_is_valid(&name));
    }

    #[test]
    fn arbitrary_text_is_rarely_a_locale_name(name in "\\PC{0,8}") {
        prop_assert_eq!(is_valid_locale_name(&name), expected_is_valid(&name));
    }

    #[test]
    fn valid_names_are_found_in_file_names(name in "[a-z]{2}_[A-Z]{2}", stem in "[a-z]{3,8}") {
        let path = PathBuf::from(format!("/srv/{}/{}.yaml", stem, name));
        prop_assert_eq!(locale_name_from_path(&path).unwrap(), Some(name));
    }

    #[test]
    fn text_without_verbs_is_unchanged(phrase in "[^{]{0,40}", value in "[a-z]{0,10}") {
        let args = Args::new().with("name", value);
        prop_assert_eq!(interpolate(&phrase, &args), phrase.as_str());
    }

    #[test]
    fn single_verb_is_substituted(prefix in "[^{}]{0,20}", suffix in "[^{}]{0,20}", value in "[^{}]{0,10}") {
        let phrase = format!("{}{{{{name}}}}{}", prefix, suffix);
        let args = Args::new().with("name", &value);
        prop_assert_eq!(interpolate(&phrase, &args), format!("{}{}{}", prefix, value, suffix));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn scalars_survive_load_and_lookup(sections in document_strategy()) {
        let document = render_document("en_US", &sections);
        let client = Client::new();
        client
            .register([document.into_bytes()])
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let stats = client.commit().map_err(|e| TestCaseError::fail(e.to_string()))?;

        let expected_count: usize = sections.values().map(BTreeMap::len).sum();
        prop_assert_eq!(stats.phrases, expected_count as u64);

        for (section, values) in &sections {
            for (key, value) in values {
                let full_key = format!("{}/{}", section, key);
                prop_assert_eq!(
                    client.translate("en_US", &full_key, None),
                    value.expected_phrase()
                );
            }
        }
    }
}
