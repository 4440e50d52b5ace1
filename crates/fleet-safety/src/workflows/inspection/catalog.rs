use std::collections::BTreeMap;

use super::domain::SectionKind;

/// One catalog entry: a stable key, a display label, the violation points
/// carried by trip-behavior items, and whether a negative answer demands
/// remarks text.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistItem {
    pub key: &'static str,
    pub label: &'static str,
    pub points: Option<u16>,
    pub remarks_required_on_negative: bool,
}

impl ChecklistItem {
    const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            points: None,
            remarks_required_on_negative: false,
        }
    }

    const fn remarks_on_negative(mut self) -> Self {
        self.remarks_required_on_negative = true;
        self
    }
}

/// Trip behavior items monitored during the trip, each carrying a fixed
/// violation-point weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripBehaviorItem {
    SpeedSchoolZone,
    SpeedMarketArea,
    MaxSpeedOpenRoad,
    RailwayCrossing,
    TollGate,
    HazardousZoneSpeed,
    ExcessiveDriving,
    TrafficInfractions,
    Incidents,
    ScheduledBreaks,
    FatigueReporting,
    RestStopsUsage,
}

impl TripBehaviorItem {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::SpeedSchoolZone,
            Self::SpeedMarketArea,
            Self::MaxSpeedOpenRoad,
            Self::RailwayCrossing,
            Self::TollGate,
            Self::HazardousZoneSpeed,
            Self::ExcessiveDriving,
            Self::TrafficInfractions,
            Self::Incidents,
            Self::ScheduledBreaks,
            Self::FatigueReporting,
            Self::RestStopsUsage,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::SpeedSchoolZone => "speed_school_zone",
            Self::SpeedMarketArea => "speed_market_area",
            Self::MaxSpeedOpenRoad => "max_speed_open_road",
            Self::RailwayCrossing => "railway_crossing",
            Self::TollGate => "toll_gate",
            Self::HazardousZoneSpeed => "hazardous_zone_speed",
            Self::ExcessiveDriving => "excessive_driving",
            Self::TrafficInfractions => "traffic_infractions",
            Self::Incidents => "incidents",
            Self::ScheduledBreaks => "scheduled_breaks",
            Self::FatigueReporting => "fatigue_reporting",
            Self::RestStopsUsage => "rest_stops_usage",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SpeedSchoolZone => "Speed in School Zone",
            Self::SpeedMarketArea => "Speed in Market Area",
            Self::MaxSpeedOpenRoad => "Max Speed on Open Road",
            Self::RailwayCrossing => "Railway Crossing",
            Self::TollGate => "Toll Gate",
            Self::HazardousZoneSpeed => "Speed in Hazardous Zone",
            Self::ExcessiveDriving => "Excessive Driving",
            Self::TrafficInfractions => "Traffic Infractions",
            Self::Incidents => "Incidents",
            Self::ScheduledBreaks => "Scheduled Breaks",
            Self::FatigueReporting => "Fatigue Reporting",
            Self::RestStopsUsage => "Rest Stops Usage",
        }
    }

    /// Violation points added when this behavior is marked as a violation.
    pub const fn points(self) -> u16 {
        match self {
            Self::SpeedSchoolZone => 5,
            Self::SpeedMarketArea => 5,
            Self::MaxSpeedOpenRoad => 3,
            Self::RailwayCrossing => 10,
            Self::TollGate => 2,
            Self::HazardousZoneSpeed => 10,
            Self::ExcessiveDriving => 8,
            Self::TrafficInfractions => 10,
            Self::Incidents => 15,
            Self::ScheduledBreaks => 3,
            Self::FatigueReporting => 5,
            Self::RestStopsUsage => 2,
        }
    }
}

/// Driving conduct checklist reviewed after the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivingBehaviorItem {
    ObeysTrafficRules,
    SafeSpeedDistance,
    AvoidsHarshManeuvers,
    NoPhoneUse,
    HeadlightsVisibility,
    LoadSecurity,
    AbnormalSoundsReporting,
    NoOverloading,
    BreakdownReporting,
    EmergencyProcedures,
    ContactControlCenter,
}

impl DrivingBehaviorItem {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::ObeysTrafficRules,
            Self::SafeSpeedDistance,
            Self::AvoidsHarshManeuvers,
            Self::NoPhoneUse,
            Self::HeadlightsVisibility,
            Self::LoadSecurity,
            Self::AbnormalSoundsReporting,
            Self::NoOverloading,
            Self::BreakdownReporting,
            Self::EmergencyProcedures,
            Self::ContactControlCenter,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::ObeysTrafficRules => "obeys_traffic_rules",
            Self::SafeSpeedDistance => "safe_speed_distance",
            Self::AvoidsHarshManeuvers => "avoids_harsh_maneuvers",
            Self::NoPhoneUse => "no_phone_use",
            Self::HeadlightsVisibility => "headlights_visibility",
            Self::LoadSecurity => "load_security",
            Self::AbnormalSoundsReporting => "abnormal_sounds_reporting",
            Self::NoOverloading => "no_overloading",
            Self::BreakdownReporting => "breakdown_reporting",
            Self::EmergencyProcedures => "emergency_procedures",
            Self::ContactControlCenter => "contact_control_center",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ObeysTrafficRules => "Obeys Traffic Rules",
            Self::SafeSpeedDistance => "Safe Speed & Distance",
            Self::AvoidsHarshManeuvers => "Avoids Harsh Maneuvers",
            Self::NoPhoneUse => "No Phone Use While Driving",
            Self::HeadlightsVisibility => "Headlights & Visibility",
            Self::LoadSecurity => "Load Security",
            Self::AbnormalSoundsReporting => "Reports Abnormal Sounds",
            Self::NoOverloading => "No Overloading",
            Self::BreakdownReporting => "Reports Breakdowns",
            Self::EmergencyProcedures => "Follows Emergency Procedures",
            Self::ContactControlCenter => "Contacts Control Center",
        }
    }
}

/// Immutable registry of every checklist item per section. Constructed once
/// at startup and shared by reference with the step tracker and the scoring
/// engines; never mutated afterwards.
#[derive(Debug)]
pub struct ChecklistCatalog {
    sections: BTreeMap<SectionKind, Vec<ChecklistItem>>,
}

impl ChecklistCatalog {
    pub fn standard() -> Self {
        let mut sections = BTreeMap::new();

        sections.insert(
            SectionKind::HealthFitness,
            vec![
                ChecklistItem::new("adequate_rest", "Adequate Rest (8+ hours)"),
                ChecklistItem::new("alcohol_test", "Alcohol/Drug Test").remarks_on_negative(),
                ChecklistItem::new("fit_for_duty", "Fit for Duty"),
                ChecklistItem::new("no_health_impairment", "No Health Impairment"),
                ChecklistItem::new("fatigue_checklist", "Fatigue Checklist Completed")
                    .remarks_on_negative(),
                ChecklistItem::new("temperature_check", "Temperature Check"),
                ChecklistItem::new("medication_clear", "Not on Medication")
                    .remarks_on_negative(),
            ],
        );

        sections.insert(
            SectionKind::Documentation,
            vec![
                ChecklistItem::new("certificate_of_fitness", "Certificate of Fitness"),
                ChecklistItem::new("road_tax", "Road Tax"),
                ChecklistItem::new("insurance", "Insurance"),
                ChecklistItem::new("trip_authorization", "Trip Authorization Signed"),
                ChecklistItem::new("logbook", "Vehicle Logbook Present"),
                ChecklistItem::new("driver_handbook", "Driver Handbook Present"),
                ChecklistItem::new("permits", "Permits Valid"),
                ChecklistItem::new("ppe_available", "PPE Available"),
                ChecklistItem::new("route_familiarity", "Route Familiarity"),
                ChecklistItem::new("emergency_procedures", "Emergency Procedures Known"),
                ChecklistItem::new("gps_activated", "GPS Tracking Activated"),
                ChecklistItem::new("safety_briefing", "Safety Briefing Provided"),
                ChecklistItem::new("rtsa_clearance", "RTSA Clearance"),
            ],
        );

        sections.insert(
            SectionKind::Exterior,
            vec![
                ChecklistItem::new("tires", "Tires"),
                ChecklistItem::new("lights", "Lights"),
                ChecklistItem::new("mirrors", "Mirrors"),
                ChecklistItem::new("windshield", "Windshield"),
                ChecklistItem::new("body_condition", "Body Condition"),
                ChecklistItem::new("loose_parts", "Loose Parts"),
                ChecklistItem::new("leaks", "Leaks"),
            ],
        );

        sections.insert(
            SectionKind::EngineFluid,
            vec![
                ChecklistItem::new("engine_oil", "Engine Oil"),
                ChecklistItem::new("coolant", "Coolant"),
                ChecklistItem::new("brake_fluid", "Brake Fluid"),
                ChecklistItem::new("transmission_fluid", "Transmission Fluid"),
                ChecklistItem::new("power_steering_fluid", "Power Steering Fluid"),
                ChecklistItem::new("battery", "Battery"),
            ],
        );

        sections.insert(
            SectionKind::InteriorCabin,
            vec![
                ChecklistItem::new("dashboard_indicators", "Dashboard Indicators"),
                ChecklistItem::new("seatbelts", "Seatbelts"),
                ChecklistItem::new("horn", "Horn"),
                ChecklistItem::new("fire_extinguisher", "Fire Extinguisher"),
                ChecklistItem::new("first_aid_kit", "First Aid Kit"),
                ChecklistItem::new("safety_triangles", "Safety Triangles"),
            ],
        );

        sections.insert(
            SectionKind::Functional,
            vec![
                ChecklistItem::new("brakes", "Brakes"),
                ChecklistItem::new("steering", "Steering"),
                ChecklistItem::new("suspension", "Suspension"),
                ChecklistItem::new("hvac", "HVAC"),
            ],
        );

        sections.insert(
            SectionKind::SafetyEquipment,
            vec![
                ChecklistItem::new("fire_extinguisher", "Fire Extinguisher"),
                ChecklistItem::new("first_aid_kit", "First Aid Kit"),
                ChecklistItem::new("reflective_triangles", "Reflective Triangles"),
                ChecklistItem::new("wheel_chocks", "Wheel Chocks"),
                ChecklistItem::new("spare_tyre", "Spare Tyre"),
                ChecklistItem::new("torch", "Torch"),
                ChecklistItem::new("emergency_contacts", "Emergency Contacts"),
                ChecklistItem::new("gps_tracker", "GPS Tracker"),
            ],
        );

        sections.insert(
            SectionKind::TripBehavior,
            TripBehaviorItem::ordered()
                .into_iter()
                .map(|item| ChecklistItem {
                    key: item.key(),
                    label: item.label(),
                    points: Some(item.points()),
                    remarks_required_on_negative: false,
                })
                .collect(),
        );

        sections.insert(
            SectionKind::DrivingBehavior,
            DrivingBehaviorItem::ordered()
                .into_iter()
                .map(|item| ChecklistItem::new(item.key(), item.label()))
                .collect(),
        );

        sections.insert(
            SectionKind::PostTripReport,
            vec![
                ChecklistItem::new("fault_free", "Vehicle Fault-Free").remarks_on_negative(),
                ChecklistItem::new("final_inspection_signed", "Final Inspection Signed"),
                ChecklistItem::new("policy_compliance", "Compliance with Company Policy"),
                ChecklistItem::new("attitude_cooperation", "Attitude & Cooperation"),
                ChecklistItem::new("incident_free", "Incident-Free Trip").remarks_on_negative(),
            ],
        );

        Self { sections }
    }

    pub fn items(&self, section: SectionKind) -> &[ChecklistItem] {
        self.sections
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn item(&self, section: SectionKind, key: &str) -> Option<&ChecklistItem> {
        self.items(section).iter().find(|item| item.key == key)
    }

    pub fn contains(&self, section: SectionKind, key: &str) -> bool {
        self.item(section, key).is_some()
    }

    pub fn count(&self, section: SectionKind) -> u32 {
        self.items(section).len() as u32
    }

    /// Denominator for pre-trip percentage-of-total calculations: the sum of
    /// item counts across every pre-trip section.
    pub fn total_pre_trip_items(&self) -> u32 {
        SectionKind::pre_trip()
            .into_iter()
            .map(|section| self.count(section))
            .sum()
    }

    /// Denominator for the post-trip checklist, covering trip behavior,
    /// driving behavior, and the post-trip report.
    pub fn total_post_trip_items(&self) -> u32 {
        SectionKind::post_trip()
            .into_iter()
            .map(|section| self.count(section))
            .sum()
    }
}
