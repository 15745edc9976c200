use serde_yaml::Value;

/// Borrowed view into a loosely-typed YAML tree.
///
/// Lookups never fail: indexing into a missing key or into a node of the wrong
/// shape yields an undefined node, and every scalar accessor takes the value to
/// return when the node is undefined or can not be coerced.
#[derive(Debug, Clone, Copy)]
pub struct YamlNode<'a> {
    value: Option<&'a Value>,
}

impl<'a> YamlNode<'a> {
    pub fn new(value: &'a Value) -> Self {
        YamlNode {
            value: Some(untag(value)),
        }
    }

    pub fn undefined() -> Self {
        YamlNode { value: None }
    }

    /// Child of a mapping node by string key.
    pub fn get(&self, key: &str) -> YamlNode<'a> {
        match self.value {
            Some(Value::Mapping(map)) => map
                .get(key)
                .map(YamlNode::new)
                .unwrap_or_else(YamlNode::undefined),
            _ => YamlNode::undefined(),
        }
    }

    /// True if the key is present, even with an empty or `~` value.
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_map(&self) -> bool {
        matches!(self.value, Some(Value::Mapping(_)))
    }

    /// Elements of a sequence node; empty for anything else.
    pub fn elements(&self) -> impl Iterator<Item = YamlNode<'a>> + 'a {
        let seq: &'a [Value] = match self.value {
            Some(Value::Sequence(seq)) => seq.as_slice(),
            _ => &[],
        };
        seq.iter().map(YamlNode::new)
    }

    /// Key/value pairs of a mapping node; empty for anything else.
    pub fn entries(&self) -> impl Iterator<Item = (YamlNode<'a>, YamlNode<'a>)> + 'a {
        let map = match self.value {
            Some(Value::Mapping(map)) => Some(map),
            _ => None,
        };
        map.into_iter()
            .flat_map(|map| map.iter())
            .map(|(k, v)| (YamlNode::new(k), YamlNode::new(v)))
    }

    /// Scalar as text. Numbers and booleans are rendered the way they appear
    /// in the document.
    pub fn as_string_or(&self, default: &str) -> String {
        match self.value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }

    /// Scalar as an integer. Quoted integers are accepted.
    pub fn as_int_or(&self, default: i64) -> i64 {
        match self.value {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Scalar as a boolean. Accepts YAML 1.1 spellings such as `yes` and `on`
    /// when they were quoted.
    pub fn as_bool_or(&self, default: bool) -> bool {
        match self.value {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "y" | "on" => true,
                "false" | "no" | "n" | "off" => false,
                _ => default,
            },
            _ => default,
        }
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Value {
        serde_yaml::from_str(content).unwrap()
    }

    #[test]
    fn test_missing_and_wrong_shape_fall_back() {
        let doc = parse("name: test\nport: [1, 2]\n");
        let root = YamlNode::new(&doc);
        assert_eq!(root.get("missing").as_string_or("def"), "def");
        assert_eq!(root.get("port").as_int_or(7), 7);
        assert_eq!(root.get("name").get("nested").as_bool_or(true), true);
        assert!(!root.get("missing").is_defined());
    }

    #[test]
    fn test_null_value_is_defined() {
        let doc = parse("tilde: ~
empty:
name: x
");
        let root = YamlNode::new(&doc);
        assert!(root.get("tilde").is_defined());
        assert!(root.get("empty").is_defined());
        assert_eq!(root.get("empty").as_string_or("def"), "def");
        assert!(!root.get("name").get("child").is_defined());
    }

    #[test]
    fn test_scalar_coercion() {
        let doc = parse("a: 443\nb: \"8388\"\nc: true\nd: \"yes\"\ne: 1.5\n");
        let root = YamlNode::new(&doc);
        assert_eq!(root.get("a").as_string_or(""), "443");
        assert_eq!(root.get("a").as_int_or(0), 443);
        assert_eq!(root.get("b").as_int_or(0), 8388);
        assert_eq!(root.get("c").as_string_or(""), "true");
        assert!(root.get("d").as_bool_or(false));
        assert_eq!(root.get("e").as_int_or(-1), -1);
    }

    #[test]
    fn test_entries_and_elements() {
        let doc = parse("list: [a, b]\nmap: {Host: x, Other: y}\n");
        let root = YamlNode::new(&doc);
        let list: Vec<String> = root.get("list").elements().map(|n| n.as_string_or("")).collect();
        assert_eq!(list, vec!["a", "b"]);
        assert_eq!(root.get("map").entries().count(), 2);
        assert_eq!(root.get("list").entries().count(), 0);
        assert_eq!(root.get("map").elements().count(), 0);
    }
}
