use abi::{
    validate_password, Error, NewUser, Role, User, ADMIN_ID, MAX_USERS,
};
use tracing::{info, warn};

/// Credentials and roles of everyone who can log in.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn records(&self) -> &[User] {
        &self.users
    }

    pub fn find(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Plain-text credential match. Inactive users still authenticate; it
    /// is up to the caller to turn them away.
    pub fn authenticate(&self, id: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.id == id && u.password == password)
    }

    /// Put the built-in administrator back if it is missing. Returns whether
    /// the directory changed.
    pub fn ensure_admin(&mut self) -> bool {
        if self
            .users
            .iter()
            .any(|u| u.id == ADMIN_ID && u.role == Role::Administrator)
        {
            return false;
        }
        warn!("administrator account missing, restoring default credentials");
        self.users.insert(0, User::administrator(1));
        self.renumber();
        true
    }

    pub fn register(&mut self, user: NewUser) -> Result<User, Error> {
        user.validate()?;
        if self.find(&user.id).is_some() {
            return Err(Error::DuplicateUser(user.id));
        }
        if self.users.len() >= MAX_USERS {
            return Err(Error::DirectoryFull(MAX_USERS));
        }
        let user = User::new(self.users.len() as u32 + 1, user);
        info!("registered {} as {}", user.id, user.role);
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn remove(&mut self, id: &str) -> Result<User, Error> {
        guard_admin(id)?;
        let pos = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| Error::UserNotFound(id.to_string()))?;
        let user = self.users.remove(pos);
        self.renumber();
        info!("user {} removed", id);
        Ok(user)
    }

    pub fn set_password(&mut self, id: &str, password: &str) -> Result<User, Error> {
        guard_admin(id)?;
        validate_password(password)?;
        let user = self.find_mut(id)?;
        if user.password == password {
            return Err(Error::InvalidUser(
                "new password can not be same as current password".into(),
            ));
        }
        user.password = password.to_string();
        info!("password updated for {}", id);
        Ok(user.clone())
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> Result<User, Error> {
        guard_admin(id)?;
        let user = self.find_mut(id)?;
        user.active = active;
        info!("user {} is now {}", id, if active { "active" } else { "inactive" });
        Ok(user.clone())
    }

    /// The customer a staff member is booking for. Must exist, be a
    /// customer and be active.
    pub fn active_customer(&self, id: &str) -> Result<&User, Error> {
        let user = self
            .find(id)
            .ok_or_else(|| Error::UserNotFound(id.to_string()))?;
        if user.role != Role::Customer {
            return Err(Error::NotCustomer(id.to_string()));
        }
        if !user.active {
            return Err(Error::UserInactive(id.to_string()));
        }
        Ok(user)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut User, Error> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::UserNotFound(id.to_string()))
    }

    fn renumber(&mut self) {
        for (i, u) in self.users.iter_mut().enumerate() {
            u.seq = i as u32 + 1;
        }
    }
}

fn guard_admin(id: &str) -> Result<(), Error> {
    if id == ADMIN_ID {
        return Err(Error::ProtectedAccount(id.to_string()));
    }
    Ok(())
}
