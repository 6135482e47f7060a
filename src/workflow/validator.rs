// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Workflow validator.
//!
//! Fast-fail checks run before anything is signed or sent. The chaincode
//! enforces the same rules again; a pass here is never proof that the ledger
//! will accept the call.

use std::str::FromStr;

use crate::contract::{Function, Param};
use crate::ledger::ValidationError;
use crate::models::{
    GradeKey, LedgerCall, NewGrade, NewPrize, NewStudent, PrizeKey, RecordKind, RecordStatus,
    StudentKey,
};

/// The only legal moves are `Pending -> Approved` and `Pending -> Rejected`.
pub fn check_transition(
    kind: RecordKind,
    current: RecordStatus,
    requested: RecordStatus,
) -> Result<(), ValidationError> {
    if current == RecordStatus::Pending && requested.is_terminal() {
        Ok(())
    } else {
        Err(ValidationError::IllegalTransition {
            kind,
            from: current,
            to: requested,
        })
    }
}

/// Check the field set of a typed call.
pub fn validate_call(call: &LedgerCall) -> Result<(), ValidationError> {
    match call {
        LedgerCall::AddStudent(s) => {
            non_empty("school", &s.school)?;
            non_empty("major", &s.major)?;
            positive("studentId", s.student_id)?;
            non_empty("name", &s.name)
        }
        LedgerCall::ValidateStudent(key, _) | LedgerCall::QueryStudent(key) => student_key(key),
        LedgerCall::AddGrade(g) => {
            non_empty("courseName", &g.course_name)?;
            non_empty("courseId", &g.course_id)?;
            non_empty("teacher", &g.teacher)?;
            non_empty("school", &g.school)?;
            positive("studentId", g.student_id)?;
            positive("year", g.year.into())?;
            positive("semester", g.semester.into())?;
            if !g.score.is_finite() || g.score < 0.0 {
                return Err(ValidationError::InvalidNumber {
                    field: "score",
                    value: g.score.to_string(),
                });
            }
            Ok(())
        }
        LedgerCall::ValidateGrade(key, _) | LedgerCall::QueryGrade(key) => grade_key(key),
        LedgerCall::AddPrice(p) => {
            non_empty("school", &p.school)?;
            positive("studentId", p.student_id)?;
            non_empty("prizeName", &p.prize_name)?;
            non_empty("prizeId", &p.prize_id)?;
            positive("year", p.year.into())?;
            non_empty("level", &p.level)?;
            non_empty("institution", &p.institution)
        }
        LedgerCall::ValidatePrice(key, _) | LedgerCall::QueryPrice(key) => {
            non_empty("priceId", &key.prize_id)
        }
    }
}

fn student_key(key: &StudentKey) -> Result<(), ValidationError> {
    non_empty("school", &key.school)?;
    positive("studentId", key.student_id)
}

fn grade_key(key: &GradeKey) -> Result<(), ValidationError> {
    non_empty("school", &key.school)?;
    positive("studentId", key.student_id)?;
    non_empty("courseId", &key.course_id)?;
    positive("year", key.year.into())?;
    positive("semester", key.semester.into())
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

fn positive(field: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(())
}

/// Walks the declared parameters alongside the supplied values.
struct Positional<'a> {
    params: std::slice::Iter<'static, Param>,
    values: std::slice::Iter<'a, String>,
}

impl<'a> Positional<'a> {
    fn next(&mut self) -> Result<(&'static str, &'a str), ValidationError> {
        match (self.params.next(), self.values.next()) {
            (Some(param), Some(value)) => Ok((param.name, value.as_str())),
            // Arity is checked up front; running dry means the table and the
            // parser disagree.
            _ => Err(ValidationError::EmptyField("<missing>")),
        }
    }

    fn text(&mut self) -> Result<String, ValidationError> {
        let (name, value) = self.next()?;
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField(name));
        }
        // Forwarded as given; only the checks ignore surrounding whitespace.
        Ok(value.to_string())
    }

    fn number<T: FromStr>(&mut self) -> Result<T, ValidationError> {
        let (name, value) = self.next()?;
        value.trim().parse().map_err(|_| ValidationError::InvalidNumber {
            field: name,
            value: value.to_string(),
        })
    }

    fn status(&mut self) -> Result<RecordStatus, ValidationError> {
        let (_, value) = self.next()?;
        value.trim().parse()
    }
}

impl LedgerCall {
    /// Build a typed call from positional string arguments in table order.
    pub fn from_positional(function: Function, args: &[String]) -> Result<Self, ValidationError> {
        if args.len() != function.arity() {
            return Err(ValidationError::Arity {
                function: function.name(),
                expected: function.arity(),
                actual: args.len(),
            });
        }
        let mut p = Positional {
            params: function.spec().params.iter(),
            values: args.iter(),
        };

        Ok(match function {
            Function::AddStudent => LedgerCall::AddStudent(NewStudent {
                school: p.text()?,
                major: p.text()?,
                student_id: p.number()?,
                name: p.text()?,
            }),
            Function::ValidateStudent => LedgerCall::ValidateStudent(
                StudentKey {
                    school: p.text()?,
                    student_id: p.number()?,
                },
                p.status()?,
            ),
            Function::QueryStudent => LedgerCall::QueryStudent(StudentKey {
                school: p.text()?,
                student_id: p.number()?,
            }),
            Function::AddGrade => LedgerCall::AddGrade(NewGrade {
                course_name: p.text()?,
                course_id: p.text()?,
                teacher: p.text()?,
                school: p.text()?,
                student_id: p.number()?,
                year: p.number()?,
                score: p.number()?,
                semester: p.number()?,
            }),
            Function::ValidateGrade => LedgerCall::ValidateGrade(
                GradeKey {
                    school: p.text()?,
                    student_id: p.number()?,
                    course_id: p.text()?,
                    year: p.number()?,
                    semester: p.number()?,
                },
                p.status()?,
            ),
            Function::QueryGrade => LedgerCall::QueryGrade(GradeKey {
                school: p.text()?,
                student_id: p.number()?,
                course_id: p.text()?,
                year: p.number()?,
                semester: p.number()?,
            }),
            Function::AddPrice => LedgerCall::AddPrice(NewPrize {
                school: p.text()?,
                student_id: p.number()?,
                prize_name: p.text()?,
                prize_id: p.text()?,
                year: p.number()?,
                level: p.text()?,
                institution: p.text()?,
            }),
            Function::ValidatePrice => LedgerCall::ValidatePrice(
                PrizeKey {
                    prize_id: p.text()?,
                },
                p.status()?,
            ),
            Function::QueryPrice => LedgerCall::QueryPrice(PrizeKey {
                prize_id: p.text()?,
            }),
        })
    }
}
