//! Example protobuf message encoding/decoding using pbnet.
//!
//! Demonstrates a derived `#[derive(ProtoMessage)]` contract equivalent to:
//!
//! ```proto
//! message PhoneNumber {
//!     string number = 1;
//!     int32 type = 2;
//! }
//!
//! message Person {
//!     string name = 1;
//!     int32 id = 2;
//!     string email = 3;
//!     repeated PhoneNumber phones = 4;
//! }
//! ```

use pbnet::codec::{LazyMessage, ProtoString};
use pbnet::ProtoMessage;

#[derive(Debug, Clone, PartialEq, Default, ProtoMessage)]
pub struct PhoneNumber {
    #[proto(tag = 1)]
    pub number: ProtoString,
    #[proto(tag = 2)]
    pub phone_type: i32,
}

#[derive(Debug, Clone, Default, ProtoMessage)]
pub struct Person {
    #[proto(tag = 1)]
    pub name: ProtoString,
    #[proto(tag = 2)]
    pub id: i32,
    #[proto(tag = 3)]
    pub email: ProtoString,
    #[proto(tag = 4, repeated)]
    pub phones: Vec<LazyMessage<PhoneNumber>>,
}

fn main() {
    let phones = [("555-1234", 1), ("555-5678", 2)]
        .into_iter()
        .map(|(number, phone_type)| {
            let phone = PhoneNumber {
                number: ProtoString::from(number),
                phone_type,
            };
            LazyMessage::new(pbnet::serialize(&phone))
        })
        .collect();

    let person = Person {
        name: ProtoString::from("Alice"),
        id: 123,
        email: ProtoString::from("alice@example.com"),
        phones,
    };

    let buf = pbnet::serialize(&person);

    println!("Encoded {} bytes", buf.len());
    println!("Raw bytes: {:02x?}", buf);
    println!();

    let decoded: Person = pbnet::deserialize(&buf).unwrap();

    println!("Decoded Person:");
    println!("  name: {}", decoded.name.as_str());
    println!("  id: {}", decoded.id);
    println!("  email: {}", decoded.email.as_str());
    println!("  phones_len: {}", decoded.phones.len());

    for (i, lazy_phone) in decoded.phones.iter().enumerate() {
        let phone = lazy_phone.decode().unwrap();
        println!("  phone[{}]: {} (type={})", i, phone.number.as_str(), phone.phone_type);
    }
}
