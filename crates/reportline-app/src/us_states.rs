// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsState {
    pub code: &'static str,
    pub name: &'static str,
}

const fn state(code: &'static str, name: &'static str) -> UsState {
    UsState { code, name }
}

pub const ALL: [UsState; 51] = [
    state("AK", "Alaska"),
    state("AL", "Alabama"),
    state("AR", "Arkansas"),
    state("AZ", "Arizona"),
    state("CA", "California"),
    state("CO", "Colorado"),
    state("CT", "Connecticut"),
    state("DE", "Delaware"),
    state("DC", "District Of Columbia"),
    state("FL", "Florida"),
    state("GA", "Georgia"),
    state("HI", "Hawaii"),
    state("IA", "Iowa"),
    state("ID", "Idaho"),
    state("IL", "Illinois"),
    state("IN", "Indiana"),
    state("KS", "Kansas"),
    state("KY", "Kentucky"),
    state("LA", "Louisiana"),
    state("MA", "Massachusetts"),
    state("MD", "Maryland"),
    state("ME", "Maine"),
    state("MI", "Michigan"),
    state("MN", "Minnesota"),
    state("MO", "Missouri"),
    state("MS", "Mississippi"),
    state("MT", "Montana"),
    state("NC", "North Carolina"),
    state("ND", "North Dakota"),
    state("NE", "Nebraska"),
    state("NH", "New Hampshire"),
    state("NJ", "New Jersey"),
    state("NM", "New Mexico"),
    state("NV", "Nevada"),
    state("NY", "New York"),
    state("OH", "Ohio"),
    state("OK", "Oklahoma"),
    state("OR", "Oregon"),
    state("PA", "Pennsylvania"),
    state("RI", "Rhode Island"),
    state("SC", "South Carolina"),
    state("SD", "South Dakota"),
    state("TN", "Tennessee"),
    state("TX", "Texas"),
    state("UT", "Utah"),
    state("VA", "Virginia"),
    state("VT", "Vermont"),
    state("WA", "Washington"),
    state("WI", "Wisconsin"),
    state("WV", "West Virginia"),
    state("WY", "Wyoming"),
];

pub fn find(code: &str) -> Option<&'static UsState> {
    ALL.iter().find(|state| state.code == code)
}

pub fn state_name(code: &str) -> Option<&'static str> {
    find(code).map(|state| state.name)
}

/// Case-insensitive substring match on code or name, in table order. A blank
/// query matches everything.
pub fn search_states(query: &str) -> Vec<&'static UsState> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return ALL.iter().collect();
    }
    ALL.iter()
        .filter(|state| {
            state.code.to_lowercase().contains(&needle)
                || state.name.to_lowercase().contains(&needle)
        })
        .collect()
}
