//! Named collections of labeled arrays.

use nino_calendar::CalendarDate;

use crate::array::LabeledArray;
use crate::attrs::{AttrValue, Attributes};
use crate::axis::{AxisSource, AxisTag, resolve};
use crate::error::GridError;

/// A collection of [`LabeledArray`] variables with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    variables: Vec<LabeledArray>,
    attrs: Attributes,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from arrays, keyed by their names.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateVariable`] if two arrays share a name.
    pub fn from_variables(variables: impl IntoIterator<Item = LabeledArray>) -> Result<Self, GridError> {
        variables
            .into_iter()
            .try_fold(Self::new(), |ds, var| ds.with_variable(var))
    }

    /// Adds a variable.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateVariable`] if the name is taken.
    pub fn with_variable(mut self, var: LabeledArray) -> Result<Self, GridError> {
        if self.variable(var.name()).is_some() {
            return Err(GridError::DuplicateVariable {
                name: var.name().to_string(),
            });
        }
        self.variables.push(var);
        Ok(self)
    }

    /// Adds a variable or replaces the one with the same name in place.
    pub fn with_replaced(mut self, var: LabeledArray) -> Self {
        match self.variables.iter_mut().find(|v| v.name() == var.name()) {
            Some(slot) => *slot = var,
            None => self.variables.push(var),
        }
        self
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn variables(&self) -> &[LabeledArray] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&LabeledArray> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Like [`Dataset::variable`], failing when absent.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingVariable`] if there is no such variable.
    pub fn require(&self, name: &str) -> Result<&LabeledArray, GridError> {
        self.variable(name).ok_or_else(|| GridError::MissingVariable {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(LabeledArray::name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Names of data variables: every variable whose name does not contain
    /// `bound` or `bnd`.
    pub fn data_variable_names(&self) -> Vec<String> {
        self.names()
            .filter(|n| !n.contains("bound") && !n.contains("bnd"))
            .map(str::to_string)
            .collect()
    }

    /// The explicit variable list if given, otherwise the data variables.
    pub fn get_variables(&self, variables: Option<&[String]>) -> Vec<String> {
        match variables {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => self.data_variable_names(),
        }
    }

    /// Keeps only the named variables, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingVariable`] for an unknown name.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, GridError> {
        let variables = names
            .iter()
            .map(|n| self.require(n.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            variables,
            attrs: self.attrs.clone(),
        })
    }

    /// Applies `f` to every variable.
    pub fn map(&self, f: impl FnMut(&LabeledArray) -> LabeledArray) -> Self {
        Self {
            variables: self.variables.iter().map(f).collect(),
            attrs: self.attrs.clone(),
        }
    }

    /// Fallible [`Dataset::map`].
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn try_map<E>(&self, mut f: impl FnMut(&LabeledArray) -> Result<LabeledArray, E>) -> Result<Self, E> {
        Ok(Self {
            variables: self.variables.iter().map(&mut f).collect::<Result<_, _>>()?,
            attrs: self.attrs.clone(),
        })
    }

    /// Applies `f` to the named variables, replacing them; others are kept.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`, or
    /// [`GridError::MissingVariable`] (converted into `E`) for an unknown name.
    pub fn map_variables<E: From<GridError>>(
        &self,
        names: &[String],
        mut f: impl FnMut(&LabeledArray) -> Result<LabeledArray, E>,
    ) -> Result<Self, E> {
        let mut out = self.clone();
        for name in names {
            let var = self.require(name)?;
            out = out.with_replaced(f(var)?);
        }
        Ok(out)
    }

    /// Drops coordinates no longer spanning an axis of their variable.
    pub fn remove_unused_coordinates(&self) -> Self {
        Self {
            variables: self
                .variables
                .iter()
                .map(LabeledArray::remove_unused_coordinates)
                .collect(),
            attrs: self.attrs.clone(),
        }
    }

    /// Joins `parts` along `dim`, in order.
    ///
    /// Variables of the first part spanning `dim` are joined with the
    /// variables of the same name in every other part; the others, and
    /// the attributes, are taken from the first part.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingVariable`] when a part lacks a variable
    /// to join, and the errors of [`LabeledArray::concat`].
    pub fn concat(parts: &[Dataset], dim: &str) -> Result<Self, GridError> {
        let Some((first, rest)) = parts.split_first() else {
            return Ok(Self::new());
        };
        first.try_map(|var| {
            if !var.has_axis(dim) {
                return Ok(var.clone());
            }
            let others = rest
                .iter()
                .map(|part| part.require(var.name()).cloned())
                .collect::<Result<Vec<_>, _>>()?;
            var.concat(&others, dim)
        })
    }

    /// Moves `dim` to the front of every variable that has it.
    ///
    /// # Errors
    ///
    /// Propagates [`LabeledArray::set_dim_as_first`] errors.
    pub fn set_dim_as_first(&self, dim: &str) -> Result<Self, GridError> {
        self.try_map(|v| {
            if v.has_axis(dim) {
                v.set_dim_as_first(dim)
            } else {
                Ok(v.clone())
            }
        })
    }

    /// First and last date of the dataset's time axis.
    ///
    /// Returns `None` if no time axis resolves or it is empty.
    pub fn time_bounds(&self) -> Option<(CalendarDate, CalendarDate)> {
        let dim = resolve(self, AxisTag::Time)?;
        self.variables
            .iter()
            .filter(|v| v.has_axis(&dim))
            .find_map(|v| v.time_bounds(&dim).ok().flatten())
    }
}

impl AxisSource for Dataset {
    fn axis_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for var in &self.variables {
            for name in var.axis_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}
