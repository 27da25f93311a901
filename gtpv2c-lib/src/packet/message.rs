//! GTPv2-C message types (3GPP TS 29.274, table 6.1-1)
//!
//! The header codec carries the message type opaquely; these constants only
//! give the common values a name.
//!
//! ```
//! use gtpv2c::packet::message::Gtpv2MessageType;
//!
//! let mt = Gtpv2MessageType::from(32);
//! assert_eq!(mt, Gtpv2MessageType::CREATE_SESSION_REQUEST);
//! assert_eq!(format!("{}", mt), "create-session-request");
//! assert_eq!(format!("{}", Gtpv2MessageType::from(250)), "0xfa");
//! ```

crate::protocol_constants! {
    Gtpv2MessageType:
        // Path management
        ECHO_REQUEST = 1;
        ECHO_RESPONSE = 2;
        VERSION_NOT_SUPPORTED_INDICATION = 3;

        // Tunnel management
        CREATE_SESSION_REQUEST = 32;
        CREATE_SESSION_RESPONSE = 33;
        MODIFY_BEARER_REQUEST = 34;
        MODIFY_BEARER_RESPONSE = 35;
        DELETE_SESSION_REQUEST = 36;
        DELETE_SESSION_RESPONSE = 37;
        CHANGE_NOTIFICATION_REQUEST = 38;
        CHANGE_NOTIFICATION_RESPONSE = 39;
        REMOTE_UE_REPORT_NOTIFICATION = 40;
        REMOTE_UE_REPORT_ACKNOWLEDGE = 41;
        MODIFY_BEARER_COMMAND = 64;
        MODIFY_BEARER_FAILURE_INDICATION = 65;
        DELETE_BEARER_COMMAND = 66;
        DELETE_BEARER_FAILURE_INDICATION = 67;
        BEARER_RESOURCE_COMMAND = 68;
        BEARER_RESOURCE_FAILURE_INDICATION = 69;
        DOWNLINK_DATA_NOTIFICATION_FAILURE_INDICATION = 70;
        TRACE_SESSION_ACTIVATION = 71;
        TRACE_SESSION_DEACTIVATION = 72;
        STOP_PAGING_INDICATION = 73;
        CREATE_BEARER_REQUEST = 95;
        CREATE_BEARER_RESPONSE = 96;
        UPDATE_BEARER_REQUEST = 97;
        UPDATE_BEARER_RESPONSE = 98;
        DELETE_BEARER_REQUEST = 99;
        DELETE_BEARER_RESPONSE = 100;
        DELETE_PDN_CONNECTION_SET_REQUEST = 101;
        DELETE_PDN_CONNECTION_SET_RESPONSE = 102;
        PGW_DOWNLINK_TRIGGERING_NOTIFICATION = 103;
        PGW_DOWNLINK_TRIGGERING_ACKNOWLEDGE = 104;

        // Mobility management
        IDENTIFICATION_REQUEST = 128;
        IDENTIFICATION_RESPONSE = 129;
        CONTEXT_REQUEST = 130;
        CONTEXT_RESPONSE = 131;
        CONTEXT_ACKNOWLEDGE = 132;
        FORWARD_RELOCATION_REQUEST = 133;
        FORWARD_RELOCATION_RESPONSE = 134;
        FORWARD_RELOCATION_COMPLETE_NOTIFICATION = 135;
        FORWARD_RELOCATION_COMPLETE_ACKNOWLEDGE = 136;
        FORWARD_ACCESS_CONTEXT_NOTIFICATION = 137;
        FORWARD_ACCESS_CONTEXT_ACKNOWLEDGE = 138;
        RELOCATION_CANCEL_REQUEST = 139;
        RELOCATION_CANCEL_RESPONSE = 140;
        CONFIGURATION_TRANSFER_TUNNEL = 141;
        DETACH_NOTIFICATION = 149;
        DETACH_ACKNOWLEDGE = 150;
        CS_PAGING_INDICATION = 151;
        RAN_INFORMATION_RELAY = 152;
        ALERT_MME_NOTIFICATION = 153;
        ALERT_MME_ACKNOWLEDGE = 154;
        UE_ACTIVITY_NOTIFICATION = 155;
        UE_ACTIVITY_ACKNOWLEDGE = 156;
        ISR_STATUS_INDICATION = 157;
        UE_REGISTRATION_QUERY_REQUEST = 158;
        UE_REGISTRATION_QUERY_RESPONSE = 159;

        // Non-3GPP access / indirect forwarding
        CREATE_FORWARDING_TUNNEL_REQUEST = 160;
        CREATE_FORWARDING_TUNNEL_RESPONSE = 161;
        SUSPEND_NOTIFICATION = 162;
        SUSPEND_ACKNOWLEDGE = 163;
        RESUME_NOTIFICATION = 164;
        RESUME_ACKNOWLEDGE = 165;
        CREATE_INDIRECT_DATA_FORWARDING_TUNNEL_REQUEST = 166;
        CREATE_INDIRECT_DATA_FORWARDING_TUNNEL_RESPONSE = 167;
        DELETE_INDIRECT_DATA_FORWARDING_TUNNEL_REQUEST = 168;
        DELETE_INDIRECT_DATA_FORWARDING_TUNNEL_RESPONSE = 169;
        RELEASE_ACCESS_BEARERS_REQUEST = 170;
        RELEASE_ACCESS_BEARERS_RESPONSE = 171;
        DOWNLINK_DATA_NOTIFICATION = 176;
        DOWNLINK_DATA_NOTIFICATION_ACKNOWLEDGE = 177;
        PGW_RESTART_NOTIFICATION = 179;
        PGW_RESTART_NOTIFICATION_ACKNOWLEDGE = 180;
        UPDATE_PDN_CONNECTION_SET_REQUEST = 200;
        UPDATE_PDN_CONNECTION_SET_RESPONSE = 201;
        MODIFY_ACCESS_BEARERS_REQUEST = 211;
        MODIFY_ACCESS_BEARERS_RESPONSE = 212;

        // MBMS
        MBMS_SESSION_START_REQUEST = 231;
        MBMS_SESSION_START_RESPONSE = 232;
        MBMS_SESSION_UPDATE_REQUEST = 233;
        MBMS_SESSION_UPDATE_RESPONSE = 234;
        MBMS_SESSION_STOP_REQUEST = 235;
        MBMS_SESSION_STOP_RESPONSE = 236;
}

impl Gtpv2MessageType {
    /// Returns true for the path management messages that are sent without a TEID
    #[inline]
    pub fn is_path_management(&self) -> bool {
        matches!(self.0, 1..=3)
    }
}
