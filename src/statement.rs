//! Prepared MDX statements and parameter metadata.

use std::sync::Arc;

use serde_json::Value;

use crate::client::XmlaClient;
use crate::error::{XmlaError, XmlaResult};
use crate::olap_type::{
    dispatch, ClassNameHelper, OlapType, PrecisionHelper, SignedHelper, SqlType, SqlTypeHelper,
};
use crate::xmla::dom::Element;

/// A declared statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub olap_type: OlapType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, olap_type: OlapType) -> Self {
        Self {
            name: name.into(),
            olap_type,
        }
    }
}

/// An MDX statement with reflected parameters.
///
/// XML/A does not report statement parameters, so the list is whatever the
/// caller declared. Ordinals are 1-based.
#[derive(Debug)]
pub struct PreparedStatement {
    client: Arc<XmlaClient>,
    mdx: String,
    parameters: Vec<Parameter>,
    values: Vec<Option<Value>>,
}

impl PreparedStatement {
    pub fn new(client: Arc<XmlaClient>, mdx: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        let values = vec![None; parameters.len()];
        Self {
            client,
            mdx: mdx.into(),
            parameters,
            values,
        }
    }

    pub fn mdx(&self) -> &str {
        &self.mdx
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    fn index(&self, ordinal: usize) -> XmlaResult<usize> {
        if ordinal == 0 || ordinal > self.parameters.len() {
            return Err(XmlaError::ParameterOutOfRange {
                ordinal,
                count: self.parameters.len(),
            });
        }
        Ok(ordinal - 1)
    }

    fn parameter(&self, ordinal: usize) -> XmlaResult<&Parameter> {
        Ok(&self.parameters[self.index(ordinal)?])
    }

    pub fn parameter_name(&self, ordinal: usize) -> XmlaResult<&str> {
        Ok(&self.parameter(ordinal)?.name)
    }

    pub fn parameter_olap_type(&self, ordinal: usize) -> XmlaResult<OlapType> {
        Ok(self.parameter(ordinal)?.olap_type)
    }

    pub fn parameter_type(&self, ordinal: usize) -> XmlaResult<SqlType> {
        dispatch(self.parameter(ordinal)?.olap_type, &SqlTypeHelper)
    }

    pub fn parameter_type_name(&self, ordinal: usize) -> XmlaResult<&'static str> {
        Ok(self.parameter(ordinal)?.olap_type.name())
    }

    /// Name of the value class bound for the parameter.
    pub fn parameter_class_name(&self, ordinal: usize) -> XmlaResult<&'static str> {
        dispatch(self.parameter(ordinal)?.olap_type, &ClassNameHelper)
    }

    pub fn is_signed(&self, ordinal: usize) -> XmlaResult<bool> {
        dispatch(self.parameter(ordinal)?.olap_type, &SignedHelper)
    }

    pub fn precision(&self, ordinal: usize) -> XmlaResult<i32> {
        dispatch(self.parameter(ordinal)?.olap_type, &PrecisionHelper)
    }

    pub fn scale(&self, ordinal: usize) -> XmlaResult<i32> {
        self.parameter(ordinal)?;
        Ok(0)
    }

    pub fn set_value(&mut self, ordinal: usize, value: Value) -> XmlaResult<()> {
        let index = self.index(ordinal)?;
        self.values[index] = Some(value);
        Ok(())
    }

    pub fn unset(&mut self, ordinal: usize) -> XmlaResult<()> {
        let index = self.index(ordinal)?;
        self.values[index] = None;
        Ok(())
    }

    pub fn is_set(&self, ordinal: usize) -> XmlaResult<bool> {
        Ok(self.values[self.index(ordinal)?].is_some())
    }

    pub fn value(&self, ordinal: usize) -> XmlaResult<Option<&Value>> {
        Ok(self.values[self.index(ordinal)?].as_ref())
    }

    pub fn add_batch(&mut self) -> XmlaResult<()> {
        Err(XmlaError::Unsupported("batch execution".to_string()))
    }

    pub fn execute_update(&self) -> XmlaResult<u64> {
        Err(XmlaError::Unsupported("updates".to_string()))
    }

    pub fn set_stream(&mut self, ordinal: usize, _bytes: Vec<u8>) -> XmlaResult<()> {
        self.index(ordinal)?;
        Err(XmlaError::Unsupported("stream parameters".to_string()))
    }

    /// Run the statement and return the multidimensional dataset root.
    pub async fn execute(&self) -> XmlaResult<Element> {
        self.client.execute(&self.mdx).await
    }
}
