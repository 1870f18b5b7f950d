use alloc::string::String;
use alloc::sync::Arc;

use log::{debug, trace};
use pax_reflect::{Reflect, Value};

use crate::AccessError;
use crate::chain::NullPolicy;
use crate::chain::policy::NullAction;
use crate::point::Accessor;

/// Where a mutable traversal ended.
pub(crate) enum Reached<'a> {
    Value(&'a mut dyn Reflect),
    /// Link `position` read nothing and the policy let the traversal stop.
    Absent { position: usize },
}

/// The links of one traversal and how absent values are handled.
///
/// With `result_last` set, the last link produces the result rather than
/// a carrier, and an absent result is returned as is.
pub(crate) struct Traversal<'c> {
    pub links: &'c [Arc<dyn Accessor>],
    pub policy: &'c dyn NullPolicy,
    pub path: &'c dyn Fn() -> String,
    pub result_last: bool,
}

impl Traversal<'_> {
    #[inline]
    fn is_result(&self, position: usize) -> bool {
        self.result_last && position + 1 == self.links.len()
    }

    #[inline]
    fn wrap(&self, position: usize) -> impl FnOnce(AccessError) -> AccessError + '_ {
        move |error| AccessError::in_chain((self.path)(), position, error)
    }

    fn null_traversal(&self, position: usize, link: &dyn Accessor) -> AccessError {
        AccessError::NullTraversal {
            path: (self.path)(),
            position,
            link: link.description(),
        }
    }

    /// Reads through shared references.
    ///
    /// Values read from an owned carrier are cloned out. A vivified value
    /// is carried on but cannot be stored in the target.
    pub fn read<'a>(&self, target: &'a dyn Reflect) -> Result<Option<Value<'a>>, AccessError> {
        let mut carrier = Value::Borrowed(target);
        for (position, link) in self.links.iter().enumerate() {
            let next = read_link(link.as_ref(), &carrier).map_err(self.wrap(position))?;
            carrier = match next {
                Some(next) => next,
                None if self.is_result(position) => return Ok(None),
                None => match self
                    .policy
                    .on_null(link.as_ref())
                    .map_err(self.wrap(position))?
                {
                    NullAction::Fail => return Err(self.null_traversal(position, link.as_ref())),
                    NullAction::ShortCircuit => {
                        trace!("`{}` short-circuited at link {position}", (self.path)());
                        return Ok(None);
                    }
                    NullAction::Vivify(value) => Value::Owned(value),
                },
            };
        }
        Ok(Some(carrier))
    }

    /// Reads through mutable references, storing vivified values in the target.
    pub fn read_mut<'a>(&self, target: &'a mut dyn Reflect) -> Result<Reached<'a>, AccessError> {
        let mut carrier = target;
        for (position, link) in self.links.iter().enumerate() {
            let present = link
                .read(&*carrier)
                .map_err(self.wrap(position))?
                .is_some();
            if !present {
                if self.is_result(position) {
                    return Ok(Reached::Absent { position });
                }
                match self
                    .policy
                    .on_null(link.as_ref())
                    .map_err(self.wrap(position))?
                {
                    NullAction::Fail => return Err(self.null_traversal(position, link.as_ref())),
                    NullAction::ShortCircuit => return Ok(Reached::Absent { position }),
                    NullAction::Vivify(value) => {
                        debug!("vivifying `{}` in `{}`", link.description(), (self.path)());
                        let mutator = link.to_mutator().map_err(self.wrap(position))?;
                        mutator
                            .write(&mut *carrier, Some(value))
                            .map_err(self.wrap(position))?;
                    }
                }
            }
            carrier = match link.read_mut(carrier).map_err(self.wrap(position))? {
                Some(next) => next,
                None => return Ok(Reached::Absent { position }),
            };
        }
        Ok(Reached::Value(carrier))
    }
}

fn read_link<'a>(
    link: &dyn Accessor,
    carrier: &Value<'a>,
) -> Result<Option<Value<'a>>, AccessError> {
    match carrier {
        Value::Borrowed(value) => link.read(*value),
        Value::Owned(value) => Ok(link.read(value.as_ref())?.map(Value::detach)),
    }
}
