//! Per-user navigation state.
//!
//! A `Session` is an owned value handed to whichever front end drives it.
//! Every transition either succeeds completely or returns an error and leaves
//! the session as it was.

use std::fmt;
use tracing::info;

use crate::error::{AppError, Result};
use crate::records::{EntryGrid, EntryShape, RecordSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Auth,
    SubjectSetup,
    SubjectDetails,
    Recommendations,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Screen::Auth => "auth",
            Screen::SubjectSetup => "subject setup",
            Screen::SubjectDetails => "subject details",
            Screen::Recommendations => "recommendations",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    screen: Screen,
    user: Option<UserInfo>,
    shape: Option<EntryShape>,
    records: Option<RecordSet>,
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::MissingField(field));
    }
    Ok(())
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn shape(&self) -> Option<EntryShape> {
        self.shape
    }

    pub fn records(&self) -> Option<&RecordSet> {
        self.records.as_ref()
    }

    fn expect_screen(&self, allowed: &[Screen], action: &'static str) -> Result<()> {
        if allowed.contains(&self.screen) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                action,
                screen: self.screen.name(),
            })
        }
    }

    /// Credentials are required but never checked.
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<()> {
        self.expect_screen(&[Screen::Auth], "register")?;
        require(name, "Name")?;
        require(email, "Email")?;
        require(password, "Password")?;
        info!(email, "registered");
        self.user = Some(UserInfo {
            name: name.to_string(),
            email: email.to_string(),
        });
        self.screen = Screen::SubjectSetup;
        Ok(())
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        self.expect_screen(&[Screen::Auth], "sign in")?;
        require(email, "Email")?;
        require(password, "Password")?;
        info!(email, "signed in");
        self.user = Some(UserInfo {
            name: "User".to_string(),
            email: email.to_string(),
        });
        self.screen = Screen::SubjectSetup;
        Ok(())
    }

    pub fn configure_manual(&mut self, shape: EntryShape) -> Result<()> {
        self.expect_screen(&[Screen::SubjectSetup], "set up manual entry")?;
        shape.validate()?;
        self.shape = Some(shape);
        self.screen = Screen::SubjectDetails;
        Ok(())
    }

    pub fn submit_grid(&mut self, grid: &EntryGrid) -> Result<&RecordSet> {
        self.expect_screen(&[Screen::SubjectDetails], "submit subject details")?;
        let shape = self.shape.ok_or_else(|| {
            AppError::InvalidShape("manual entry has not been set up".to_string())
        })?;
        let records = RecordSet::from_grid(&shape, grid)?;
        info!(rows = records.len(), "subject details submitted");
        self.screen = Screen::Recommendations;
        Ok(self.records.insert(records))
    }

    pub fn submit_upload(&mut self, records: RecordSet) -> Result<&RecordSet> {
        self.expect_screen(&[Screen::SubjectSetup], "upload a dataset")?;
        info!(rows = records.len(), "dataset uploaded");
        self.screen = Screen::Recommendations;
        Ok(self.records.insert(records))
    }

    pub fn back_to_setup(&mut self) -> Result<()> {
        self.expect_screen(
            &[Screen::SubjectDetails, Screen::Recommendations],
            "go back to setup",
        )?;
        self.screen = Screen::SubjectSetup;
        Ok(())
    }

    pub fn sign_out(&mut self) {
        *self = Session::new();
    }

    /// The current record set, or `NoData` before anything was submitted.
    pub fn require_records(&self) -> Result<&RecordSet> {
        self.records.as_ref().ok_or(AppError::NoData)
    }
}
