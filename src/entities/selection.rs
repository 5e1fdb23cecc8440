use std::fmt;
use std::str::FromStr;

use crate::entities::coordinate::LatLng;
use crate::map::LayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Driver,
    Passenger,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Driver => "Driver",
            Role::Passenger => "Passenger",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driver" => Ok(Role::Driver),
            "passenger" => Ok(Role::Passenger),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// How map clicks are assigned to endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeMode {
    /// First click is the driver, second the passenger, then locked.
    #[default]
    ClickOrder,
    /// Clicks overwrite whichever role is currently selected.
    RoleSelect,
}

impl FromStr for IntakeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "click-order" | "click_order" => Ok(IntakeMode::ClickOrder),
            "role-select" | "role_select" => Ok(IntakeMode::RoleSelect),
            other => Err(format!("unknown intake mode: {}", other)),
        }
    }
}

/// One endpoint: its coordinate and the marker drawn for it.
#[derive(Debug, Clone, Default)]
pub struct EndpointSelection {
    pub coordinate: Option<LatLng>,
    pub marker: Option<LayerId>,
}

impl EndpointSelection {
    pub fn is_set(&self) -> bool {
        self.coordinate.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    pub driver: EndpointSelection,
    pub passenger: EndpointSelection,
    pub mode: IntakeMode,
    /// Only consulted in role-select mode.
    pub active_role: Role,
}

impl SelectionState {
    pub fn new(mode: IntakeMode) -> Self {
        Self {
            driver: EndpointSelection::default(),
            passenger: EndpointSelection::default(),
            mode,
            active_role: Role::Driver,
        }
    }

    pub fn endpoint_mut(&mut self, role: Role) -> &mut EndpointSelection {
        match role {
            Role::Driver => &mut self.driver,
            Role::Passenger => &mut self.passenger,
        }
    }

    /// Both coordinates, if both are set.
    pub fn both(&self) -> Option<(LatLng, LatLng)> {
        Some((self.driver.coordinate?, self.passenger.coordinate?))
    }

    /// Which endpoint the next click writes to, or `None` when click-order
    /// intake is already complete.
    pub fn next_target(&self) -> Option<Role> {
        match self.mode {
            IntakeMode::RoleSelect => Some(self.active_role),
            IntakeMode::ClickOrder => {
                if !self.driver.is_set() {
                    Some(Role::Driver)
                } else if !self.passenger.is_set() {
                    Some(Role::Passenger)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_order_targets() {
        let mut state = SelectionState::new(IntakeMode::ClickOrder);
        assert_eq!(state.next_target(), Some(Role::Driver));

        state.driver.coordinate = Some(LatLng::new(37.76, -122.42));
        assert_eq!(state.next_target(), Some(Role::Passenger));

        state.passenger.coordinate = Some(LatLng::new(37.75, -122.40));
        assert_eq!(state.next_target(), None);
    }

    #[test]
    fn test_role_select_always_targets_active_role() {
        let mut state = SelectionState::new(IntakeMode::RoleSelect);
        state.active_role = Role::Passenger;
        state.passenger.coordinate = Some(LatLng::new(37.75, -122.40));
        state.driver.coordinate = Some(LatLng::new(37.76, -122.42));
        assert_eq!(state.next_target(), Some(Role::Passenger));
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(" Driver ".parse::<Role>(), Ok(Role::Driver));
        assert!("rider".parse::<Role>().is_err());
    }
}
