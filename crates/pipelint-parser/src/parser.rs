//! YAML manifest parser.

use serde::Deserialize;
use serde_yaml::Value;
use std::io::Read;

use crate::error::ParseError;
use crate::resource::Resource;

/// Decodes a byte stream into generic resources.
pub struct ResourceParser<R> {
    reader: R,
}

impl<R: Read> ResourceParser<R> {
    pub fn for_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Parse the first document of the stream.
    pub fn parse(self) -> Result<Resource, ParseError> {
        self.parse_all()?.into_iter().next().ok_or(ParseError::Empty)
    }

    /// Parse every non-empty document of a `---` separated stream.
    pub fn parse_all(mut self) -> Result<Vec<Resource>, ParseError> {
        let mut content = String::new();
        self.reader.read_to_string(&mut content)?;

        let mut resources = Vec::new();
        for document in serde_yaml::Deserializer::from_str(&content) {
            let value = Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            resources.push(Resource::from_value(value)?);
        }
        Ok(resources)
    }
}

impl<'a> ResourceParser<&'a [u8]> {
    pub fn for_str(content: &'a str) -> Self {
        Self::for_reader(content.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipelint_core::Kind;

    #[test]
    fn test_parse_leading_separator() {
        let res = ResourceParser::for_str(
            "---\napiVersion: tekton.dev/v1beta1\nkind: Pipeline\nmetadata:\n  name: p\n",
        )
        .parse()
        .unwrap();
        assert_eq!(res.kind(), &Kind::Pipeline);
        assert_eq!(res.name(), "p");
    }

    #[test]
    fn test_parse_all_skips_empty_documents() {
        let yaml = "---\napiVersion: tekton.dev/v1\nkind: Task\nmetadata: {name: a}\n---\n---\napiVersion: tekton.dev/v1\nkind: Pipeline\nmetadata: {name: b}\n";
        let resources = ResourceParser::for_str(yaml).parse_all().unwrap();
        let names: Vec<&str> = resources.iter().map(Resource::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_empty_stream() {
        assert!(matches!(
            ResourceParser::for_str("").parse(),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = ResourceParser::for_str("kind: [unclosed").parse().unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }

    #[test]
    fn test_for_reader() {
        let bytes: &[u8] = b"apiVersion: v1\nkind: ConfigMap\nmetadata: {name: cm}\n";
        let res = ResourceParser::for_reader(std::io::Cursor::new(bytes))
            .parse()
            .unwrap();
        assert_eq!(res.kind(), &Kind::Other("ConfigMap".to_string()));
    }
}
