#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Accountant = 3,
    Employee = 4,
    Applicant = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Accountant),
            4 => Some(Role::Employee),
            5 => Some(Role::Applicant),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}
