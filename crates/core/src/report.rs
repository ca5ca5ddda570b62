//! Ivy resolve report model
//!
//! Deserializes the `<ivy-report>` XML document written by an Ivy resolve.
//! Only the parts the graph needs are modelled; artifacts, licenses and
//! configuration listings are ignored.
//!
//! ```text
//! <ivy-report>
//!   <info organisation=".." module=".." revision=".."/>
//!   <dependencies>
//!     <module organisation=".." name="..">
//!       <revision name="..">
//!         <caller organisation=".." name=".." callerrev=".."/>
//!       </revision>
//!     </module>
//!   </dependencies>
//! </ivy-report>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::error::GraphError;
use crate::graph::ModuleId;

/// Document element every resolve report starts with
pub const ROOT_ELEMENT: &str = "ivy-report";

/// Prefix Ivy gives `callerrev` when the project has no published revision
const WORKING_REVISION_PREFIX: &str = "working@";

/// The parsed report document
#[derive(Debug, Clone, Deserialize)]
pub struct IvyReport {
    pub info: ReportInfo,
    /// `None` when the report has no module collection at all
    pub dependencies: Option<ReportDependencies>,
}

/// The project the report was resolved for
#[derive(Debug, Clone, Deserialize)]
pub struct ReportInfo {
    #[serde(rename = "@organisation")]
    pub organisation: String,
    #[serde(rename = "@module")]
    pub module: String,
    #[serde(rename = "@revision")]
    pub revision: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportDependencies {
    #[serde(rename = "module", default)]
    pub modules: Vec<ReportModule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportModule {
    #[serde(rename = "@organisation")]
    pub organisation: String,
    #[serde(rename = "@name")]
    pub name: String,
    /// One entry per resolved (or evicted) revision
    #[serde(rename = "revision", default)]
    pub revisions: Vec<ReportRevision>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRevision {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "caller", default)]
    pub callers: Vec<ReportCaller>,
}

/// A module (or the project itself) that asked for a revision
#[derive(Debug, Clone, Deserialize)]
pub struct ReportCaller {
    #[serde(rename = "@organisation")]
    pub organisation: String,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@callerrev")]
    pub callerrev: String,
}

impl IvyReport {
    /// Parse report XML
    ///
    /// # Errors
    /// Returns [`GraphError::Parse`] when the document element is not
    /// `<ivy-report>` or the XML does not match the report layout.
    pub fn from_xml(text: &str) -> Result<Self, GraphError> {
        check_root_element(text)?;
        Ok(quick_xml::de::from_str(text)?)
    }

    /// The root module described by `<info>`
    pub fn root_module(&self) -> ModuleId {
        ModuleId::new(
            &self.info.organisation,
            &self.info.module,
            &self.info.revision,
        )
    }

    /// Whether a caller denotes the project itself rather than a dependency
    ///
    /// Organisation and name must match `<info>`. The revision must match too,
    /// unless it is a `working@<host>` placeholder, which Ivy writes for
    /// unpublished projects and which need not agree with `<info revision>`.
    /// Another revision of the project module is an ordinary dependency.
    pub fn is_root_caller(&self, caller: &ReportCaller) -> bool {
        caller.organisation == self.info.organisation
            && caller.name == self.info.module
            && (caller.callerrev == self.info.revision
                || caller.callerrev.starts_with(WORKING_REVISION_PREFIX))
    }
}

/// Reject documents whose first element is not `<ivy-report>`
fn check_root_element(text: &str) -> Result<(), GraphError> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                let name = element.name();
                return if name.as_ref() == ROOT_ELEMENT.as_bytes() {
                    Ok(())
                } else {
                    Err(GraphError::Parse(format!(
                        "expected <{ROOT_ELEMENT}> document element, found <{}>",
                        String::from_utf8_lossy(name.as_ref())
                    )))
                };
            }
            Ok(Event::Eof) => {
                return Err(GraphError::Parse("document has no elements".to_string()));
            }
            Ok(_) => {}
            Err(err) => return Err(GraphError::Parse(err.to_string())),
        }
    }
}

impl ReportModule {
    pub fn module_id(&self, revision: &ReportRevision) -> ModuleId {
        ModuleId::new(&self.organisation, &self.name, &revision.name)
    }
}

impl ReportCaller {
    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(&self.organisation, &self.name, &self.callerrev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ivy-report version="1.0">
  <info organisation="com.acme" module="app" revision="1.0" conf="default"/>
  <configurations>
    <configuration name="default"/>
  </configurations>
  <dependencies>
    <module organisation="org.slf4j" name="slf4j-api">
      <revision name="1.7.36" status="release" position="0">
        <license name="MIT"/>
        <caller organisation="com.acme" name="app" conf="default" rev="1.7.+" callerrev="working@host"/>
        <artifacts>
          <artifact name="slf4j-api" type="jar" ext="jar"/>
        </artifacts>
      </revision>
    </module>
  </dependencies>
</ivy-report>
"#;

    #[test]
    fn test_parse_report_structure() {
        let report = IvyReport::from_xml(REPORT).unwrap();

        assert_eq!(report.root_module(), ModuleId::new("com.acme", "app", "1.0"));

        let modules = &report.dependencies.as_ref().unwrap().modules;
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].revisions.len(), 1);
        assert_eq!(modules[0].revisions[0].callers.len(), 1);
        assert_eq!(
            modules[0].module_id(&modules[0].revisions[0]),
            ModuleId::new("org.slf4j", "slf4j-api", "1.7.36")
        );
    }

    #[test]
    fn test_root_caller_ignores_callerrev() {
        let report = IvyReport::from_xml(REPORT).unwrap();
        let caller = &report.dependencies.as_ref().unwrap().modules[0].revisions[0].callers[0];

        assert_eq!(caller.callerrev, "working@host");
        assert!(report.is_root_caller(caller));
    }

    #[test]
    fn test_other_revision_of_project_is_not_root() {
        let xml = r#"<ivy-report>
  <info organisation="com.acme" module="app" revision="1.0"/>
  <dependencies>
    <module organisation="com.acme" name="app">
      <revision name="0.9">
        <caller organisation="com.acme" name="app" callerrev="1.0"/>
      </revision>
    </module>
    <module organisation="org.slf4j" name="slf4j-api">
      <revision name="1.7.36">
        <caller organisation="com.acme" name="app" callerrev="0.9"/>
      </revision>
    </module>
  </dependencies>
</ivy-report>"#;
        let report = IvyReport::from_xml(xml).unwrap();
        let modules = &report.dependencies.as_ref().unwrap().modules;

        assert!(report.is_root_caller(&modules[0].revisions[0].callers[0]));
        assert!(!report.is_root_caller(&modules[1].revisions[0].callers[0]));
    }

    #[test]
    fn test_wrong_document_element_is_error() {
        let xml = r#"<?xml version="1.0"?>
<foo>
  <info organisation="com.acme" module="app" revision="1.0"/>
  <dependencies/>
</foo>"#;

        let err = IvyReport::from_xml(xml).unwrap_err();
        assert!(matches!(&err, GraphError::Parse(message) if message.contains("<foo>")));
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(matches!(IvyReport::from_xml(""), Err(GraphError::Parse(_))));
    }

    #[test]
    fn test_missing_caller_attribute_is_error() {
        let xml = r#"<ivy-report>
  <info organisation="com.acme" module="app" revision="1.0"/>
  <dependencies>
    <module organisation="org.slf4j" name="slf4j-api">
      <revision name="1.7.36">
        <caller organisation="com.acme" callerrev="1.0"/>
      </revision>
    </module>
  </dependencies>
</ivy-report>"#;

        assert!(matches!(IvyReport::from_xml(xml), Err(GraphError::Parse(_))));
    }

    #[test]
    fn test_missing_info_is_error() {
        let xml = r#"<ivy-report><dependencies/></ivy-report>"#;

        assert!(matches!(IvyReport::from_xml(xml), Err(GraphError::Parse(_))));
    }
}
