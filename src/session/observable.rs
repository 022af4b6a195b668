/// Single-threaded stand-in for the host framework's observable field type.
///
/// Observers are plain callbacks that fire on every replacement of the value.
/// There is no unsubscribe; observers live as long as the field does.
pub struct Observable<T> {
    value: T,
    observers: Vec<Box<dyn FnMut(&T)>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            observers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value, then notify every observer with the new value.
    pub fn set(&mut self, value: T) {
        self.value = value;
        for observer in &mut self.observers {
            observer(&self.value);
        }
    }

    pub fn observe(&mut self, observer: impl FnMut(&T) + 'static) {
        self.observers.push(Box::new(observer));
    }
}
