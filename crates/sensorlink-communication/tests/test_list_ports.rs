//! Port listing only returns board-like serial devices

use sensorlink_communication::list_ports;

#[test]
fn test_listed_ports_look_like_boards() {
    // Enumeration can legitimately fail in sandboxes without udev
    if let Ok(ports) = list_ports() {
        for port in ports {
            let name = port.port_name.as_str();
            assert!(
                name.starts_with("COM")
                    || name.starts_with("/dev/ttyUSB")
                    || name.starts_with("/dev/ttyACM")
                    || name.starts_with("/dev/cu.usb"),
                "unexpected port {}",
                name
            );
        }
    }
}
