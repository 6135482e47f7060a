// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chaincode function table.
//!
//! Every callable chaincode function is declared once here with its ordered
//! parameter list, parameter types and call kind. Both the HTTP dispatcher and
//! the positional-argument parser are driven by this table.
//!
//! | Function | Args (ordered) | Kind |
//! |----------|----------------|------|
//! | `addStudent` | school, major, studentId, name | Submit |
//! | `validateStudent` | school, studentId, newStatus | Submit |
//! | `queryStudent` | school, studentId | Evaluate |
//! | `addGrade` | courseName, courseId, teacher, school, studentId, year, score, semester | Submit |
//! | `validateGrade` | school, studentId, courseId, year, semester, newStatus | Submit |
//! | `queryGrade` | school, studentId, courseId, year, semester | Evaluate |
//! | `addPrice` | school, studentId, prizeName, prizeId, year, level, institution | Submit |
//! | `validatePrice` | priceId, newStatus | Submit |
//! | `queryPrice` | priceId | Evaluate |

use std::fmt;
use std::str::FromStr;

use crate::ledger::ValidationError;
use crate::models::RecordKind;

/// Whether a function mutates ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Endorse, order and commit.
    Submit,
    /// Read-only, single round trip.
    Evaluate,
}

/// Wire type of a single positional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Non-empty free text.
    Text,
    /// Positive integer.
    Integer,
    /// Non-negative decimal.
    Decimal,
    /// `Approved` or `Rejected`.
    Status,
}

/// A named positional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
}

const fn text(name: &'static str) -> Param {
    Param { name, ty: ParamType::Text }
}

const fn integer(name: &'static str) -> Param {
    Param { name, ty: ParamType::Integer }
}

const fn decimal(name: &'static str) -> Param {
    Param { name, ty: ParamType::Decimal }
}

const fn status(name: &'static str) -> Param {
    Param { name, ty: ParamType::Status }
}

/// Table entry describing one chaincode function.
#[derive(Debug)]
pub struct FunctionSpec {
    pub function: Function,
    pub name: &'static str,
    pub kind: CallKind,
    pub record: RecordKind,
    pub params: &'static [Param],
}

/// Chaincode functions exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    AddStudent,
    ValidateStudent,
    QueryStudent,
    AddGrade,
    ValidateGrade,
    QueryGrade,
    AddPrice,
    ValidatePrice,
    QueryPrice,
}

static FUNCTIONS: [FunctionSpec; 9] = [
    FunctionSpec {
        function: Function::AddStudent,
        name: "addStudent",
        kind: CallKind::Submit,
        record: RecordKind::StudentIdentity,
        params: &[text("school"), text("major"), integer("studentId"), text("name")],
    },
    FunctionSpec {
        function: Function::ValidateStudent,
        name: "validateStudent",
        kind: CallKind::Submit,
        record: RecordKind::StudentIdentity,
        params: &[text("school"), integer("studentId"), status("newStatus")],
    },
    FunctionSpec {
        function: Function::QueryStudent,
        name: "queryStudent",
        kind: CallKind::Evaluate,
        record: RecordKind::StudentIdentity,
        params: &[text("school"), integer("studentId")],
    },
    FunctionSpec {
        function: Function::AddGrade,
        name: "addGrade",
        kind: CallKind::Submit,
        record: RecordKind::Grade,
        params: &[
            text("courseName"),
            text("courseId"),
            text("teacher"),
            text("school"),
            integer("studentId"),
            integer("year"),
            decimal("score"),
            integer("semester"),
        ],
    },
    FunctionSpec {
        function: Function::ValidateGrade,
        name: "validateGrade",
        kind: CallKind::Submit,
        record: RecordKind::Grade,
        params: &[
            text("school"),
            integer("studentId"),
            text("courseId"),
            integer("year"),
            integer("semester"),
            status("newStatus"),
        ],
    },
    FunctionSpec {
        function: Function::QueryGrade,
        name: "queryGrade",
        kind: CallKind::Evaluate,
        record: RecordKind::Grade,
        params: &[
            text("school"),
            integer("studentId"),
            text("courseId"),
            integer("year"),
            integer("semester"),
        ],
    },
    FunctionSpec {
        function: Function::AddPrice,
        name: "addPrice",
        kind: CallKind::Submit,
        record: RecordKind::Prize,
        params: &[
            text("school"),
            integer("studentId"),
            text("prizeName"),
            text("prizeId"),
            integer("year"),
            text("level"),
            text("institution"),
        ],
    },
    FunctionSpec {
        function: Function::ValidatePrice,
        name: "validatePrice",
        kind: CallKind::Submit,
        record: RecordKind::Prize,
        params: &[text("priceId"), status("newStatus")],
    },
    FunctionSpec {
        function: Function::QueryPrice,
        name: "queryPrice",
        kind: CallKind::Evaluate,
        record: RecordKind::Prize,
        params: &[text("priceId")],
    },
];

impl Function {
    pub const ALL: [Function; 9] = [
        Function::AddStudent,
        Function::ValidateStudent,
        Function::QueryStudent,
        Function::AddGrade,
        Function::ValidateGrade,
        Function::QueryGrade,
        Function::AddPrice,
        Function::ValidatePrice,
        Function::QueryPrice,
    ];

    /// Table entry for this function.
    pub fn spec(self) -> &'static FunctionSpec {
        // The table is declared in enum order.
        &FUNCTIONS[self as usize]
    }

    /// Name of the function as the chaincode knows it.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn kind(self) -> CallKind {
        self.spec().kind
    }

    pub fn record_kind(self) -> RecordKind {
        self.spec().record
    }

    /// Number of positional arguments the chaincode expects.
    pub fn arity(self) -> usize {
        self.spec().params.len()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ValidationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        FUNCTIONS
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.function)
            .ok_or_else(|| ValidationError::UnknownFunction(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_in_enum_order() {
        for function in Function::ALL {
            assert_eq!(function.spec().function, function);
        }
    }

    #[test]
    fn arities_match_chaincode_signatures() {
        let expected = [4, 3, 2, 8, 6, 5, 7, 2, 1];
        for (function, arity) in Function::ALL.iter().zip(expected) {
            assert_eq!(function.arity(), arity, "{function}");
        }
    }

    #[test]
    fn names_round_trip_and_unknown_names_fail() {
        for function in Function::ALL {
            assert_eq!(function.name().parse::<Function>().unwrap(), function);
        }
        assert!(matches!(
            "deleteStudent".parse::<Function>(),
            Err(ValidationError::UnknownFunction(name)) if name == "deleteStudent"
        ));
    }

    #[test]
    fn query_functions_are_evaluate_only() {
        let evaluates: Vec<_> = Function::ALL
            .into_iter()
            .filter(|f| f.kind() == CallKind::Evaluate)
            .collect();
        assert_eq!(
            evaluates,
            vec![Function::QueryStudent, Function::QueryGrade, Function::QueryPrice]
        );
    }
}
