use kuchiki::traits::*;

use super::NativeNode;
use crate::capabilities::Query;
use crate::error::{TreeError, TreeResult};

/// CSS selector query over the descendants of a view's root.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectorQuery;

impl Query for SelectorQuery {
    fn query(&self, root: &NativeNode, selector: &str) -> TreeResult<Vec<NativeNode>> {
        let matches = root
            .descendants()
            .select(selector)
            .map_err(|_| TreeError::InvalidSelector(selector.to_string()))?;
        Ok(matches.map(|element| element.as_node().clone()).collect())
    }
}
