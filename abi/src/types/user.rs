use std::{fmt, str::FromStr};

use super::{flag, has_digit, is_blank, parse_field, parse_flag, split_fields};
use crate::{Error, Record, UserId, MAX_FIELD_LEN};

/// Id of the built-in administrator account.
pub const ADMIN_ID: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Administrator,
    HotelStaff,
    Customer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Administrator => write!(f, "Administrator"),
            Role::HotelStaff => write!(f, "Hotel Staff"),
            Role::Customer => write!(f, "Customer"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" => Ok(Self::Administrator),
            "hotel staff" | "staff" => Ok(Self::HotelStaff),
            "customer" => Ok(Self::Customer),
            other => Err(Error::InvalidUser(format!("unknown role {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub seq: u32,
    pub name: String,
    pub id: UserId,
    pub password: String,
    pub role: Role,
    pub active: bool,
}

impl User {
    pub fn new(seq: u32, user: NewUser) -> Self {
        Self {
            seq,
            name: user.name,
            id: user.id,
            password: user.password,
            role: user.role,
            active: true,
        }
    }

    pub fn administrator(seq: u32) -> Self {
        Self {
            seq,
            name: "Administrator".into(),
            id: ADMIN_ID.into(),
            password: ADMIN_ID.into(),
            role: Role::Administrator,
            active: true,
        }
    }
}

impl Record for User {
    fn to_line(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}",
            self.seq,
            self.name,
            self.id,
            self.password,
            self.role,
            flag(self.active)
        )
    }

    fn from_line(line: &str) -> Result<Self, Error> {
        let f = split_fields(line, 6)?;
        Ok(Self {
            seq: parse_field(line, f[0])?,
            name: f[1].to_string(),
            id: f[2].to_string(),
            password: f[3].to_string(),
            role: f[4].parse().map_err(|_| Error::Parse(line.to_string()))?,
            active: parse_flag(line, f[5])?,
        })
    }
}

/// A registration request. Only staff and customers can be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub id: UserId,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            password: password.into(),
            role,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_name(&self.name)?;
        validate_user_id(&self.id)?;
        validate_password(&self.password)?;
        if self.role == Role::Administrator {
            return Err(Error::InvalidUser(
                "only hotel staff or customers can be registered".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<(), Error> {
    if is_blank(name) {
        return Err(Error::InvalidUser("name cannot be empty".into()));
    }
    if name.chars().count() > MAX_FIELD_LEN {
        return Err(Error::InvalidUser(format!(
            "name is longer than {} characters",
            MAX_FIELD_LEN
        )));
    }
    if has_digit(name) {
        return Err(Error::InvalidUser(
            "name should not contain numeric characters".into(),
        ));
    }
    if name.contains(',') {
        return Err(Error::InvalidUser("name should not contain commas".into()));
    }
    Ok(())
}

pub fn validate_user_id(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::InvalidUser("id cannot be empty".into()));
    }
    if id.chars().count() > MAX_FIELD_LEN {
        return Err(Error::InvalidUser(format!(
            "id is longer than {} characters",
            MAX_FIELD_LEN
        )));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(Error::InvalidUser("id should not contain spaces".into()));
    }
    if id.contains(',') {
        return Err(Error::InvalidUser("id should not contain commas".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), Error> {
    if password.is_empty() {
        return Err(Error::InvalidUser("password cannot be empty".into()));
    }
    if password.chars().count() > MAX_FIELD_LEN {
        return Err(Error::InvalidUser(format!(
            "password is longer than {} characters",
            MAX_FIELD_LEN
        )));
    }
    if password.contains(',') {
        return Err(Error::InvalidUser(
            "password should not contain commas".into(),
        ));
    }
    Ok(())
}
