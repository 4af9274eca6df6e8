use crate::error::{Error, Result};
use crate::expr::Tuple;
use crate::filter::CompositeConditionFilter;
use crate::operator::{Operator, PhysicalOperator};
use crate::trx::Trx;

/// Passes through child rows accepted by the filter.
pub struct PredicateOperator<'a> {
    filter: CompositeConditionFilter,
    child: Box<PhysicalOperator<'a>>,
}

impl<'a> PredicateOperator<'a> {
    #[inline]
    pub fn new(filter: CompositeConditionFilter, child: PhysicalOperator<'a>) -> Self {
        PredicateOperator {
            filter,
            child: Box::new(child),
        }
    }
}

impl<'a> Operator<'a> for PredicateOperator<'a> {
    #[inline]
    fn open(&mut self, trx: &'a Trx) -> Result<()> {
        self.child.open(trx)
    }

    #[inline]
    fn next(&mut self) -> Result<bool> {
        while self.child.next()? {
            let record = self
                .child
                .current_tuple()
                .and_then(Tuple::record)
                .ok_or(Error::Internal("predicate expects row tuple"))?;
            if self.filter.filter(record)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    #[inline]
    fn current_tuple(&self) -> Option<&Tuple<'_>> {
        self.child.current_tuple()
    }
}
