#![allow(dead_code)]

pub mod fixtures {
    use brrtbind::model::{AttributeDescriptor, ModelSchema};
    use std::sync::Arc;

    /// `first_name` and `last_name`, both required strings
    pub fn person() -> Arc<ModelSchema> {
        ModelSchema::builder("Person")
            .attribute(AttributeDescriptor::string("first_name"))
            .attribute(AttributeDescriptor::string("last_name"))
            .build()
            .unwrap()
    }

    pub fn sub_model() -> Arc<ModelSchema> {
        ModelSchema::builder("SubModel")
            .attribute(AttributeDescriptor::string("name"))
            .build()
            .unwrap()
    }

    /// One attribute of every scalar type plus a nested model, declared alphabetically.
    pub fn all_types() -> Arc<ModelSchema> {
        let sub = sub_model();
        ModelSchema::builder("AllTypes")
            .attribute(AttributeDescriptor::boolean("boolean"))
            .attribute(AttributeDescriptor::date("date"))
            .attribute(AttributeDescriptor::datetime("datetime"))
            .attribute(AttributeDescriptor::float("float"))
            .attribute(AttributeDescriptor::integer("integer"))
            .attribute(AttributeDescriptor::string("string"))
            .attribute(AttributeDescriptor::model("sub", &sub))
            .attribute(AttributeDescriptor::time("time"))
            .build()
            .unwrap()
    }

    /// `parent_name`, `parent_percent` and `children: [Child]`
    pub fn parent_with_children() -> Arc<ModelSchema> {
        let child = ModelSchema::builder("Child")
            .attribute(AttributeDescriptor::string("child_name"))
            .attribute(AttributeDescriptor::integer("child_age"))
            .build()
            .unwrap();
        ModelSchema::builder("Parent")
            .attribute(AttributeDescriptor::string("parent_name"))
            .attribute(AttributeDescriptor::float("parent_percent"))
            .attribute(AttributeDescriptor::array(
                "children",
                AttributeDescriptor::model("child", &child),
            ))
            .build()
            .unwrap()
    }

    /// Two levels of arrays: `Family.children: [ChildA]`, `ChildA.children: [ChildB]`
    pub fn family() -> Arc<ModelSchema> {
        let child_b = ModelSchema::builder("ChildB")
            .attribute(AttributeDescriptor::string("child_b_name"))
            .attribute(AttributeDescriptor::integer("child_b_age"))
            .build()
            .unwrap();
        let child_a = ModelSchema::builder("ChildA")
            .attribute(AttributeDescriptor::string("child_a_name"))
            .attribute(AttributeDescriptor::integer("child_a_age"))
            .attribute(AttributeDescriptor::array(
                "children",
                AttributeDescriptor::model("child", &child_b),
            ))
            .build()
            .unwrap();
        ModelSchema::builder("Family")
            .attribute(AttributeDescriptor::string("parent_name"))
            .attribute(AttributeDescriptor::float("parent_percent"))
            .attribute(AttributeDescriptor::array(
                "children",
                AttributeDescriptor::model("child", &child_a),
            ))
            .build()
            .unwrap()
    }
}

pub mod documents {
    use std::io::Write;

    /// A schema document exercising references, inheritance and arrays.
    pub const LIBRARY_YAML: &str = r#"
models:
  - name: Book
    description: A catalogued book
    attributes:
      - { name: title, type: string, max_length: 120 }
      - { name: isbn, type: string, format: "[0-9]{13}" }
      - { name: genre, type: string, required: false, choices: [fiction, history, science] }
      - { name: published, type: date, required: false }
  - name: Library
    attributes:
      - { name: name, type: string }
      - name: books
        type: array
        max_length: 3
        element: { type: model, model: Book }
      - { name: address, type: model, model: Address, required: false }
  - name: Address
    attributes:
      - { name: street, type: string }
      - { name: postcode, type: integer, minimum: 1000, maximum: 9999 }
  - name: BranchLibrary
    extends: Library
    attributes:
      - { name: branch_code, type: string }
"#;

    pub const LIBRARY_JSON: &str = r#"{
  "models": [
    {
      "name": "Address",
      "attributes": [
        {"name": "street", "type": "string"},
        {"name": "postcode", "type": "integer", "minimum": 1000, "maximum": 9999}
      ]
    }
  ]
}"#;

    pub const LIBRARY_TOML: &str = r#"
[[models]]
name = "Tag"

[[models.attributes]]
name = "label"
type = "string"
min_length = 1

[[models.attributes]]
name = "weight"
type = "float"
required = false
default = 1.0
"#;

    /// Write `content` to a temporary file whose extension selects the parser.
    pub fn write_document(content: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("brrtbind_test_")
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}
