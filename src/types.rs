use crate::schema::{appointments, availabilities, users};
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text,
};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(rename_all = "lowercase")]
#[diesel(sql_type = Text)]
pub enum Role {
    Student,
    Professor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Professor => "professor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Role::Student),
            "professor" => Ok(Role::Professor),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

impl ToSql<Text, Pg> for Role {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Role {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = std::str::from_utf8(bytes.as_bytes())?;
        Ok(value.parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = availabilities)]
pub struct Availability {
    pub id: i32,
    pub professor_id: i32,
    pub time_slot: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = appointments)]
pub struct Appointment {
    pub id: i32,
    pub student_id: i32,
    pub professor_id: i32,
    pub time_slot: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, as carried by a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: i32,
    pub role: Role,
}

/// Which column of the appointment ledger an identity owns rows through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Student(i32),
    Professor(i32),
}

impl Party {
    pub fn owns(&self, appointment: &Appointment) -> bool {
        match *self {
            Party::Student(id) => appointment.student_id == id,
            Party::Professor(id) => appointment.professor_id == id,
        }
    }
}

impl From<Identity> for Party {
    fn from(identity: Identity) -> Self {
        match identity.role {
            Role::Student => Party::Student(identity.id),
            Role::Professor => Party::Professor(identity.id),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Professor).unwrap(), "\"professor\"");
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::Student);
        serde_json::from_str::<Role>("\"admin\"").unwrap_err();
    }

    #[test]
    fn appointment_uses_camel_case_fields() {
        let appointment = Appointment {
            id: 7,
            student_id: 1,
            professor_id: 2,
            time_slot: "10:00 AM".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&appointment).unwrap();
        assert_eq!(value["studentId"], 1);
        assert_eq!(value["professorId"], 2);
        assert_eq!(value["timeSlot"], "10:00 AM");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn party_ownership_follows_role_column() {
        let appointment = Appointment {
            id: 1,
            student_id: 3,
            professor_id: 4,
            time_slot: "11:00 AM".into(),
            created_at: Utc::now(),
        };
        assert!(Party::Student(3).owns(&appointment));
        assert!(!Party::Student(4).owns(&appointment));
        assert!(Party::Professor(4).owns(&appointment));
        assert!(!Party::Professor(3).owns(&appointment));

        let identity = Identity {
            id: 4,
            role: Role::Professor,
        };
        assert_eq!(Party::from(identity), Party::Professor(4));
    }
}
