use bitflags::bitflags;

bitflags! {
    /// Access and property flags of a class, field or method.
    ///
    /// Some bits mean different things depending on where they appear: 0x0020
    /// is `ACC_SUPER` on a class and `ACC_SYNCHRONIZED` on a method, 0x0040 is
    /// `ACC_VOLATILE` on a field and `ACC_BRIDGE` on a method, 0x0080 is
    /// `ACC_TRANSIENT` on a field and `ACC_VARARGS` on a method.
    pub struct AccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}
