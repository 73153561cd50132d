//! Controller Fault Code Table
//! Maps numeric controller fault codes to titles, operator guidance, severity and recovery action

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a controller fault is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Can be recovered automatically
    Low,
    /// Needs the operator's attention
    Medium,
    /// Needs hands-on intervention at the arm
    High,
    /// Needs technical support; never recovered automatically
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Remediation associated with a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    AutoRetry,
    ReduceSpeed,
    RePlanPath,
    RestartRobot,
    ManualIntervention,
    ContactSupport,
    EmergencyStop,
}

impl RecoveryAction {
    /// Actions the recovery engine may run on its own, budget permitting
    pub fn is_automatic(&self) -> bool {
        matches!(
            self,
            RecoveryAction::AutoRetry | RecoveryAction::ReduceSpeed | RecoveryAction::RePlanPath
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoRetry => "auto_retry",
            Self::ReduceSpeed => "reduce_speed",
            Self::RePlanPath => "re_plan_path",
            Self::RestartRobot => "restart_robot",
            Self::ManualIntervention => "manual_intervention",
            Self::ContactSupport => "contact_support",
            Self::EmergencyStop => "emergency_stop",
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata for one known fault code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultInfo {
    pub title: &'static str,
    pub description: Option<&'static str>,
    pub action: Option<&'static str>,
    pub severity: Severity,
    pub recovery: RecoveryAction,
}

impl FaultInfo {
    const fn full(
        title: &'static str,
        description: &'static str,
        action: &'static str,
        severity: Severity,
        recovery: RecoveryAction,
    ) -> Self {
        Self {
            title,
            description: Some(description),
            action: Some(action),
            severity,
            recovery,
        }
    }

    const fn servo(title: &'static str) -> Self {
        Self {
            title,
            description: None,
            action: None,
            severity: Severity::Medium,
            recovery: RecoveryAction::RestartRobot,
        }
    }
}

/// Look up a controller fault code
///
/// Returns `None` for codes outside the table; callers escalate those.
pub fn lookup(code: u32) -> Option<FaultInfo> {
    use RecoveryAction::*;
    use Severity::*;

    let info = match code {
        1 => FaultInfo::full(
            "Emergency Stop Button Pressed",
            "The Emergency Stop Button on the controller is pushed in",
            "Release the Emergency Stop Button, then re-enable the arm",
            High,
            ManualIntervention,
        ),
        2 => FaultInfo::full(
            "Emergency IO Triggered",
            "The Emergency IO of the control box is triggered",
            "Ground the two emergency inputs of the control box, then re-enable the arm",
            High,
            ManualIntervention,
        ),
        3 => FaultInfo::full(
            "Three-state Switch Emergency Stop",
            "The Emergency Stop Button of the three-state switch is pressed",
            "Release the three-state switch Emergency Stop Button, then re-enable the arm",
            High,
            ManualIntervention,
        ),
        10 => FaultInfo::full(
            "Servo Motor Error",
            "General servo motor error",
            "Check motor connections and restart the arm",
            Medium,
            RestartRobot,
        ),
        11 => FaultInfo::servo("Servo Motor 1 Error"),
        12 => FaultInfo::servo("Servo Motor 2 Error"),
        13 => FaultInfo::servo("Servo Motor 3 Error"),
        14 => FaultInfo::servo("Servo Motor 4 Error"),
        15 => FaultInfo::servo("Servo Motor 5 Error"),
        16 => FaultInfo::servo("Servo Motor 6 Error"),
        17 => FaultInfo::servo("Servo Motor 7 Error"),
        18 => FaultInfo::full(
            "Force Torque Sensor Communication Error",
            "Force torque sensor communication error",
            "Check whether the force torque sensor is installed",
            Medium,
            ManualIntervention,
        ),
        19 => FaultInfo::full(
            "End Effector Communication Error",
            "End effector communication error",
            "Check that the end effector is installed and the baud rate is correct",
            Medium,
            ManualIntervention,
        ),
        21 => FaultInfo::full(
            "Kinematic Error",
            "The arm cannot reach the target position",
            "Re-plan the path or adjust the target position",
            Low,
            RePlanPath,
        ),
        22 => FaultInfo::full(
            "Self-Collision Error",
            "The arm is about to collide with itself",
            "Re-plan the path; if the error persists, switch to manual mode and drag the arm back to the normal area",
            Medium,
            RePlanPath,
        ),
        23 => FaultInfo::full(
            "Joints Angle Exceed Limit",
            "Joint angles are outside the allowed range",
            "Send the arm to its initial position from the live control page",
            Medium,
            ManualIntervention,
        ),
        24 => FaultInfo::full(
            "Speed Exceeds Limit",
            "Movement speed is too high",
            "Check whether the arm is out of its working range, or reduce speed and acceleration",
            Low,
            ReduceSpeed,
        ),
        25 => FaultInfo::full(
            "Planning Error",
            "Path planning failed",
            "Re-plan the path or reduce the speed",
            Low,
            RePlanPath,
        ),
        26 => FaultInfo::full(
            "Linux RT Error",
            "Real-time controller operating system error",
            "Contact technical support",
            Critical,
            ContactSupport,
        ),
        27 => FaultInfo::full(
            "Command Reply Error",
            "Command reply timeout or error",
            "Check the connection and retry",
            Low,
            AutoRetry,
        ),
        35 => FaultInfo::full(
            "Safety Boundary Limit",
            "The arm reached the safety boundary",
            "Switch to manual mode and move the arm back inside the safety boundary",
            Medium,
            ManualIntervention,
        ),
        38 => FaultInfo::full(
            "Abnormal Joint Angle",
            "Joint angles are in an abnormal state",
            "Stop the arm with the Emergency Stop Button on the control box, then contact technical support",
            Critical,
            EmergencyStop,
        ),
        _ => return None,
    };
    Some(info)
}

/// Human-readable title for any code, known or not
pub fn title(code: u32) -> String {
    match lookup(code) {
        Some(info) => info.title.to_string(),
        None => format!("Error {}", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let speed = lookup(24).unwrap();
        assert_eq!(speed.severity, Severity::Low);
        assert_eq!(speed.recovery, RecoveryAction::ReduceSpeed);

        let joint = lookup(38).unwrap();
        assert_eq!(joint.severity, Severity::Critical);
        assert_eq!(joint.recovery, RecoveryAction::EmergencyStop);

        let servo = lookup(14).unwrap();
        assert_eq!(servo.title, "Servo Motor 4 Error");
        assert!(servo.description.is_none());
    }

    #[test]
    fn test_unknown_codes() {
        for code in [0, 4, 20, 28, 36, 99, 1000] {
            assert!(lookup(code).is_none(), "code {} should be unknown", code);
        }
        assert_eq!(title(99), "Error 99");
        assert_eq!(title(27), "Command Reply Error");
    }

    #[test]
    fn test_automatic_actions() {
        assert!(RecoveryAction::AutoRetry.is_automatic());
        assert!(RecoveryAction::ReduceSpeed.is_automatic());
        assert!(RecoveryAction::RePlanPath.is_automatic());
        assert!(!RecoveryAction::RestartRobot.is_automatic());
        assert!(!RecoveryAction::ManualIntervention.is_automatic());
        assert!(!RecoveryAction::ContactSupport.is_automatic());
        assert!(!RecoveryAction::EmergencyStop.is_automatic());
    }

    #[test]
    fn test_display() {
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
        assert_eq!(RecoveryAction::RePlanPath.to_string(), "re_plan_path");
    }
}
